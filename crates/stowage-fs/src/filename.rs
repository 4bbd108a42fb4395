//! Key ⇄ file name codec.
//!
//! A key's raw string is encoded as URL-safe base64 with `=` padding
//! replaced by [`PADDING_SUBSTITUTE`], which gives names that are valid on
//! every common filesystem and decode back to exactly the original string.
//!
//! Only canonical encodings decode. Names containing `=`, non-canonical
//! padding or trailing bits, or bytes that are not UTF-8 are rejected, so
//! each key has exactly one file name and each accepted file name has
//! exactly one key.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;

/// Stands in for base64 `=` padding in file names
pub const PADDING_SUBSTITUTE: char = '~';

/// Encodes a raw key string as a file name.
///
/// The empty string encodes to the empty name, which is not a usable file
/// name; callers reject empty keys before getting here.
pub fn sanitize(raw: &str) -> String {
    URL_SAFE
        .encode(raw.as_bytes())
        .replace('=', &PADDING_SUBSTITUTE.to_string())
}

/// Decodes a file name produced by [`sanitize`].
///
/// Returns `None` for names that are not such an encoding.
pub fn desanitize(file_name: &str) -> Option<String> {
    if file_name.is_empty() || file_name.contains('=') {
        return None;
    }
    let encoded = file_name.replace(PADDING_SUBSTITUTE, "=");
    let bytes = URL_SAFE.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SAMPLES: &[&str] = &[
        "a",
        "ab",
        "abc",
        "hello world",
        "nested/path/../key",
        "C:\\windows\\style",
        "ünïcødé ✓ 日本語",
        "emoji 🦀🦀",
        "~tilde~",
        "==",
        ".hidden",
        "\0nul",
        "https://example.com/image.png?size=large&v=2",
    ];

    #[test]
    fn test_sanitize_round_trip() {
        for raw in SAMPLES {
            let name = sanitize(raw);
            assert_eq!(desanitize(&name).as_deref(), Some(*raw), "name {}", name);
        }
    }

    #[test]
    fn test_sanitized_names_are_filename_safe() {
        for raw in SAMPLES {
            let name = sanitize(raw);
            assert!(!name.is_empty());
            assert!(
                name.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '~')),
                "unsafe name {}",
                name
            );
            assert!(!name.starts_with('.'));
        }
    }

    #[test]
    fn test_sanitize_is_injective() {
        let mut names = HashSet::new();
        for raw in SAMPLES {
            assert!(names.insert(sanitize(raw)), "collision for {:?}", raw);
        }
        // Case-only differences and prefixes must stay apart.
        assert_ne!(sanitize("Key"), sanitize("key"));
        assert_ne!(sanitize("a"), sanitize("a\0"));
    }

    #[test]
    fn test_padding_substitution() {
        assert_eq!(sanitize("a"), "YQ~~");
        assert_eq!(sanitize("ab"), "YWI~");
        assert_eq!(sanitize("abc"), "YWJj");
    }

    #[test]
    fn test_desanitize_rejects_foreign_names() {
        assert_eq!(desanitize(""), None);
        assert_eq!(desanitize(".DS_Store"), None);
        assert_eq!(desanitize("notes.txt"), None);
        assert_eq!(desanitize(".a1B2c3.tmp"), None);
        // Raw padding is never produced by sanitize.
        assert_eq!(desanitize("YQ=="), None);
        // Non-canonical trailing bits.
        assert_eq!(desanitize("YR~~"), None);
        // Missing padding.
        assert_eq!(desanitize("YQ"), None);
        // Valid base64 of invalid UTF-8 (0xff).
        assert_eq!(desanitize("_w~~"), None);
    }
}
