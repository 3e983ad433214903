use rand::{thread_rng, Rng};

const SUFFIX_LEN: usize = 6;
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Builds a display slug from a fabric name.
///
/// The random suffix makes collisions unlikely, but nothing checks existing slugs, so a slug
/// must never be used as a key.
pub fn create_slug(name: &str) -> String {
    format!("{}-{}", normalize(name), random_suffix())
}

/// Lowercases `name`, collapses every run of characters outside `[a-z0-9]` into a single `-`
/// and trims leading and trailing dashes.
pub fn normalize(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn random_suffix() -> String {
    let mut rng = thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}
