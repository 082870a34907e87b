//! Heading anchor slugs.

/// Slugify heading text into an anchor id.
///
/// Unicode is transliterated to ASCII, lowercased, and every run of
/// non-alphanumeric characters collapses into a single `-`.
///
/// ```ignore
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("Über Café"), "uber-cafe");
/// ```
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_slugify_transliterates() {
        assert_eq!(slugify("Über Café"), "uber-cafe");
    }

    #[test]
    fn test_slugify_trims_separators() {
        assert_eq!(slugify("  --Getting   Started--  "), "getting-started");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
