//! Cache file naming.

use std::path::{Path, PathBuf};

/// Longest file name produced by [`cache_file_name`].
///
/// Kept well below the 255 byte limit of common filesystems so the
/// temporary-file suffix used during writes still fits.
pub const MAX_FILE_NAME_LEN: usize = 200;

/// Length of the digest suffix appended to truncated names (`-` + 16 hex).
const DIGEST_SUFFIX_LEN: usize = 17;

/// Derive the cache file name for a URL.
///
/// Scheme and path separators (and every other character that is unsafe in
/// file names) are percent-escaped. `%` itself is escaped too, which makes
/// the mapping injective: two different URLs never share a name.
///
/// Names longer than [`MAX_FILE_NAME_LEN`] are truncated and suffixed with
/// a 64-bit FNV-1a digest of the full URL.
///
/// # Example
///
/// ```
/// use stylekit::locator::cache_file_name;
///
/// assert_eq!(
///     cache_file_name("https://x.org/a/style.json"),
///     "https%3A%2F%2Fx.org%2Fa%2Fstyle.json"
/// );
/// ```
pub fn cache_file_name(url: &str) -> String {
    let mut name = String::with_capacity(url.len() + 16);
    for ch in url.chars() {
        match ch {
            '%' | '/' | '\\' | ':' | '?' | '*' | '"' | '<' | '>' | '|' | '#' | '&' | '=' => {
                name.push_str(&format!("%{:02X}", ch as u32));
            }
            c if c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    name.push_str(&format!("%{:02X}", byte));
                }
            }
            c => name.push(c),
        }
    }

    if name.len() <= MAX_FILE_NAME_LEN {
        return name;
    }

    let mut cut = MAX_FILE_NAME_LEN - DIGEST_SUFFIX_LEN;
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}-{:016x}", &name[..cut], fnv1a(url.as_bytes()))
}

/// Construct the full cache path for a URL under `cache_root`.
pub fn cache_path(cache_root: &Path, url: &str) -> PathBuf {
    cache_root.join(cache_file_name(url))
}

/// 64-bit FNV-1a. Stable across processes and toolchains.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_separators_are_escaped() {
        let name = cache_file_name("https://tiles.example.com/v3/tiles.json");
        assert!(!name.contains('/'));
        assert!(!name.contains(':'));
        assert_eq!(name, "https%3A%2F%2Ftiles.example.com%2Fv3%2Ftiles.json");
    }

    #[test]
    fn test_same_url_same_path() {
        let root = PathBuf::from("/cache");
        let url = "https://x.org/style.json?token=abc";
        assert_eq!(cache_path(&root, url), cache_path(&root, url));
    }

    #[test]
    fn test_placeholder_cannot_collide_with_literal() {
        // A literal escape sequence in the URL must not alias a separator.
        let a = cache_file_name("https://x.org/a/b");
        let b = cache_file_name("https://x.org/a%2Fb");
        assert_ne!(a, b);
    }

    #[test]
    fn test_corpus_has_no_collisions() {
        let urls = [
            "https://a.org/style.json",
            "http://a.org/style.json",
            "https://b.org/style.json",
            "https://a.org/styles.json",
            "https://a.org/v1/style.json",
            "https://a.org/v1_style.json",
            "https://a.org:8080/style.json",
            "https://a.org/style.json?x=1",
            "https://a.org/style.json?x=2",
            "https://a.org/sprite@2x.json",
            "https://a.org/sprite@2x.png",
            "mapbox://styles/a/b",
            "mapbox://styles/a_b",
        ];

        let names: HashSet<String> = urls.iter().map(|u| cache_file_name(u)).collect();
        assert_eq!(names.len(), urls.len());
    }

    #[test]
    fn test_long_names_truncated_with_digest() {
        let long_a = format!("https://x.org/{}a", "p".repeat(400));
        let long_b = format!("https://x.org/{}b", "p".repeat(400));

        let a = cache_file_name(&long_a);
        let b = cache_file_name(&long_b);

        assert!(a.len() <= MAX_FILE_NAME_LEN);
        assert!(b.len() <= MAX_FILE_NAME_LEN);
        assert_ne!(a, b);
        assert_eq!(a, cache_file_name(&long_a));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let url = format!("https://x.org/{}", "é".repeat(300));
        let name = cache_file_name(&url);
        assert!(name.len() <= MAX_FILE_NAME_LEN);
    }

    #[test]
    fn test_fnv1a_known_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }
}
