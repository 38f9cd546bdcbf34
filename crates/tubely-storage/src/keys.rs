//! Object key generation.
//!
//! Key format: `{prefix}/{random_id}.{extension}`. The random id is 32 bytes from the
//! thread-local CSPRNG, encoded as unpadded URL-safe base64 (43 characters).

use crate::traits::{StorageError, StorageResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// Number of random bytes in a key identifier.
pub const KEY_ID_BYTES: usize = 32;

/// Normalize a MIME type by stripping parameters and case
/// (e.g. "Video/MP4; codecs=avc1" -> "video/mp4").
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Check `content_type` against the allow-list and derive the file extension from its
/// subtype ("video/mp4" -> "mp4").
pub fn extension_for(content_type: &str, allowed: &[String]) -> StorageResult<String> {
    let normalized = normalize_content_type(content_type);
    if !allowed.iter().any(|ct| ct.eq_ignore_ascii_case(&normalized)) {
        return Err(StorageError::UnsupportedContentType(format!(
            "{} (allowed: {})",
            if normalized.is_empty() {
                "<missing>"
            } else {
                normalized.as_str()
            },
            allowed.join(", ")
        )));
    }

    let subtype = normalized
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or_default();

    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StorageError::UnsupportedContentType(format!(
            "{} has no usable file extension",
            normalized
        )));
    }

    Ok(subtype.to_string())
}

/// Build a key from explicit identifier bytes.
pub fn key_from_bytes(prefix: &str, id: &[u8; KEY_ID_BYTES], extension: &str) -> String {
    format!("{}/{}.{}", prefix, URL_SAFE_NO_PAD.encode(id), extension)
}

/// Generate a fresh, unpredictable key under `prefix`.
pub fn generate_key(prefix: &str, extension: &str) -> String {
    let mut id = [0u8; KEY_ID_BYTES];
    rand::rng().fill_bytes(&mut id);
    key_from_bytes(prefix, &id, extension)
}

/// Reject keys that could escape their prefix or address the bucket root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key is empty".to_string()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "key must not start with '/': {}",
            key
        )));
    }
    if key.split('/').any(|segment| segment == ".." || segment.is_empty()) {
        return Err(StorageError::InvalidKey(format!(
            "key contains an empty or '..' segment: {}",
            key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    fn video_types() -> Vec<String> {
        vec!["video/mp4".to_string()]
    }

    #[test]
    fn test_extension_from_allowed_type() {
        assert_eq!(extension_for("video/mp4", &video_types()).unwrap(), "mp4");
        assert_eq!(
            extension_for("Video/MP4; codecs=\"avc1\"", &video_types()).unwrap(),
            "mp4"
        );
    }

    #[test]
    fn test_disallowed_type_rejected() {
        for ct in ["video/avi", "image/png", "", "video"] {
            assert!(matches!(
                extension_for(ct, &video_types()),
                Err(StorageError::UnsupportedContentType(_))
            ));
        }
    }

    #[test]
    fn test_generated_keys_match_format() {
        let pattern = Regex::new(r"^(landscape|portrait|other)/[A-Za-z0-9_-]{43}\.[a-z0-9]+$").unwrap();
        for prefix in ["landscape", "portrait", "other"] {
            for _ in 0..50 {
                let key = generate_key(prefix, "mp4");
                assert!(pattern.is_match(&key), "unexpected key {}", key);
            }
        }
    }

    #[test]
    fn test_key_is_deterministic_for_same_bytes() {
        let id = [7u8; KEY_ID_BYTES];
        assert_eq!(
            key_from_bytes("portrait", &id, "mp4"),
            key_from_bytes("portrait", &id, "mp4")
        );
        assert_ne!(
            key_from_bytes("portrait", &id, "mp4"),
            key_from_bytes("portrait", &[8u8; KEY_ID_BYTES], "mp4")
        );
    }

    #[test]
    fn test_generated_keys_do_not_repeat() {
        let keys: HashSet<String> = (0..1000).map(|_| generate_key("other", "mp4")).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("landscape/abc.mp4").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/landscape/abc.mp4").is_err());
        assert!(validate_key("landscape/../secret").is_err());
        assert!(validate_key("landscape//abc.mp4").is_err());
    }
}
