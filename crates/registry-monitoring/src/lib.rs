//! Tracing setup for the registry tools.

use std::str::FromStr;
use tracing::{info, Level};
use tracing_subscriber::{
	filter::LevelFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
	EnvFilter,
};

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
	pub level: Level,
	pub with_file_and_line: bool,
	pub with_target: bool,
	pub with_span_events: FmtSpan,
	pub json_format: bool,
}

impl Default for TracingConfig {
	fn default() -> Self {
		Self {
			level: Level::INFO,
			with_file_and_line: false,
			with_target: true,
			with_span_events: FmtSpan::NONE,
			json_format: false,
		}
	}
}

impl TracingConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_level(mut self, level: Level) -> Self {
		self.level = level;
		self
	}

	pub fn with_json_format(mut self, json: bool) -> Self {
		self.json_format = json;
		self
	}

	/// Builds a config from a textual level such as `"debug"`.
	pub fn from_level_str(level: &str) -> Result<Self, String> {
		let level = Level::from_str(level).map_err(|_| format!("Invalid log level: {}", level))?;
		Ok(Self::default().with_level(level))
	}

	pub fn debug() -> Self {
		Self {
			level: Level::DEBUG,
			with_file_and_line: true,
			..Self::default()
		}
	}

	pub fn production() -> Self {
		Self {
			level: Level::INFO,
			with_file_and_line: false,
			with_target: false,
			with_span_events: FmtSpan::NONE,
			json_format: true,
		}
	}

	/// `RUST_LOG` takes precedence over the configured level.
	fn env_filter(&self) -> EnvFilter {
		EnvFilter::builder()
			.with_default_directive(LevelFilter::from_level(self.level).into())
			.from_env_lossy()
	}
}

/// Initialize tracing with the given configuration
pub fn init_tracing(config: TracingConfig) -> Result<(), Box<dyn std::error::Error>> {
	let subscriber = tracing_subscriber::registry().with(config.env_filter());

	if config.json_format {
		let json_layer = tracing_subscriber::fmt::layer()
			.json()
			.with_span_events(config.with_span_events.clone())
			.with_file(config.with_file_and_line)
			.with_line_number(config.with_file_and_line)
			.with_target(config.with_target);

		subscriber
			.with(json_layer)
			.try_init()
			.map_err(|e| format!("Failed to initialize tracing: {}", e))?;
	} else {
		let fmt_layer = tracing_subscriber::fmt::layer()
			.with_span_events(config.with_span_events.clone())
			.with_file(config.with_file_and_line)
			.with_line_number(config.with_file_and_line)
			.with_target(config.with_target);

		subscriber
			.with(fmt_layer)
			.try_init()
			.map_err(|e| format!("Failed to initialize tracing: {}", e))?;
	}

	info!("Tracing initialized with level: {:?}", config.level);
	Ok(())
}
