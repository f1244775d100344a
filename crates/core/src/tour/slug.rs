use deunicode::deunicode;

/// Derive a URL-safe slug from a tour name.
///
/// Transliterates the name to ASCII (`é` becomes `e`), lowercases it, turns
/// every run of characters that are not letters or digits into a single
/// hyphen, and trims hyphens from both ends. Applying it to its own output
/// returns the same slug.
pub fn derive_slug(name: &str) -> String {
    let ascii = deunicode(name);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars().map(|c| c.to_ascii_lowercase()) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
