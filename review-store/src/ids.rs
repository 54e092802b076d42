//! Deterministic identifiers.
//!
//! Logical review ids come from the source or from a content hash; index point
//! ids are derived from the logical id so re-ingestion overwrites in place.
//! Both use MD5 so ids stay identical to those already stored in existing
//! collections.

use md5::{Digest, Md5};

/// Numeric point id: the first 15 hex digits of MD5(`id`), i.e. the top
/// 60 bits of the digest.
///
/// Two different logical ids mapping to the same point id overwrite each other.
pub fn point_id(id: &str) -> u64 {
    let digest = Md5::digest(id.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head) >> 4
}

/// Fallback review id: `review-` + first 12 hex digits of
/// MD5(`"{title}|{text}|{date}"`).
pub fn content_review_id(title: &str, text: &str, date: &str) -> String {
    let digest = Md5::digest(format!("{title}|{text}|{date}").as_bytes());
    let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    format!("review-{hex}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_id_matches_hex_prefix() {
        let digest = Md5::digest(b"gp-123");
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        let want = u64::from_str_radix(&hex[..15], 16).unwrap();
        assert_eq!(point_id("gp-123"), want);
        assert!(point_id("gp-123") < 1 << 60);
    }

    #[test]
    fn ids_match_previously_stored_values() {
        assert_eq!(point_id("gp-123"), 691_948_036_635_676_426);
        assert_eq!(
            content_review_id("A", "Great app", "2025-11-01"),
            "review-853a55d0f4d1"
        );
    }

    #[test]
    fn point_id_is_stable_and_distinct() {
        assert_eq!(point_id("a"), point_id("a"));
        assert_ne!(point_id("a"), point_id("b"));
    }

    #[test]
    fn content_id_shape() {
        let id = content_review_id("A", "Great app", "2025-11-01");
        assert!(id.starts_with("review-"));
        assert_eq!(id.len(), "review-".len() + 12);
        assert_ne!(id, content_review_id("A", "Great app", "2025-11-02"));
    }
}
