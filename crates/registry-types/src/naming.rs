/// Lower-cases the first character of `name` and leaves the rest untouched.
///
/// This is the accessor name a deployed instance is exposed under, e.g.
/// `IdentityFactory` becomes `identityFactory`.
pub fn normalize_name(name: &str) -> String {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) => first.to_lowercase().chain(chars).collect(),
		None => String::new(),
	}
}
