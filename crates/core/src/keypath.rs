//! Sort-key path composition
//!
//! Composite sort keys are built from path segments joined by `.`, with an
//! optional zero-padded version prefix (`v00005.segment...`). Zero-padding
//! keeps lexicographic sort-key comparisons aligned with numeric version
//! order, which the historical-row write patterns rely on.
//!
//! ## Rules
//!
//! - Segments must not be empty
//! - Segments must not contain the `.` separator

use thiserror::Error;

/// Separator between sort-key path segments
pub const KEY_SEGMENT_SEPARATOR: char = '.';

/// Default zero-padding width for version-prefixed keys
///
/// Five digits keeps lexicographic and numeric order aligned through
/// version 99999.
pub const DEFAULT_VERSION_PAD_WIDTH: usize = 5;

/// Sort-key segment validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyPathError {
    /// A segment was empty
    #[error("sort-key segment cannot be empty")]
    EmptySegment,

    /// A segment contained the separator character
    #[error("sort-key segment {segment:?} contains the separator '{}'", KEY_SEGMENT_SEPARATOR)]
    SeparatorInSegment {
        /// The offending segment
        segment: String,
    },
}

/// Compose a sort key from path segments
///
/// # Errors
/// Fails if any segment is empty or contains the separator.
///
/// # Examples
///
/// ```
/// use keyrow_core::keypath::compose_key;
///
/// let key = compose_key(&["order", "1234"]).unwrap();
/// assert_eq!(key, "order.1234");
/// ```
pub fn compose_key(segments: &[&str]) -> Result<String, KeyPathError> {
    for segment in segments {
        validate_segment(segment)?;
    }
    Ok(segments.join(&KEY_SEGMENT_SEPARATOR.to_string()))
}

/// Build the zero-padded version prefix, e.g. `v00012`
pub fn versioned_key_prefix(version: u64, pad_width: usize) -> String {
    format!("v{version:0pad_width$}")
}

/// Compose a version-prefixed sort key, e.g. `v00012.order.1234`
///
/// Uses the given zero-padding width; pass
/// [`DEFAULT_VERSION_PAD_WIDTH`] unless the table declares another.
///
/// # Errors
/// Fails if any segment is empty or contains the separator.
pub fn compose_versioned_key(
    version: u64,
    segments: &[&str],
    pad_width: usize,
) -> Result<String, KeyPathError> {
    let mut parts = Vec::with_capacity(segments.len() + 1);
    let prefix = versioned_key_prefix(version, pad_width);
    parts.push(prefix.as_str());
    parts.extend_from_slice(segments);
    compose_key(&parts)
}

fn validate_segment(segment: &str) -> Result<(), KeyPathError> {
    if segment.is_empty() {
        return Err(KeyPathError::EmptySegment);
    }
    if segment.contains(KEY_SEGMENT_SEPARATOR) {
        return Err(KeyPathError::SeparatorInSegment {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // === Composition ===

    #[test]
    fn test_compose_single_segment() {
        assert_eq!(compose_key(&["orders"]).unwrap(), "orders");
    }

    #[test]
    fn test_compose_multiple_segments() {
        assert_eq!(
            compose_key(&["region", "us-west", "orders"]).unwrap(),
            "region.us-west.orders"
        );
    }

    #[test]
    fn test_compose_empty_slice() {
        assert_eq!(compose_key(&[]).unwrap(), "");
    }

    #[test]
    fn test_versioned_prefix_zero_padding() {
        assert_eq!(versioned_key_prefix(1, 5), "v00001");
        assert_eq!(versioned_key_prefix(12, 5), "v00012");
        assert_eq!(versioned_key_prefix(99999, 5), "v99999");
    }

    #[test]
    fn test_versioned_prefix_custom_width() {
        assert_eq!(versioned_key_prefix(7, 3), "v007");
        assert_eq!(versioned_key_prefix(7, 8), "v00000007");
    }

    #[test]
    fn test_versioned_prefix_overflowing_width() {
        // a version wider than the pad width is kept intact, not truncated
        assert_eq!(versioned_key_prefix(123456, 5), "v123456");
    }

    #[test]
    fn test_compose_versioned_key() {
        assert_eq!(
            compose_versioned_key(12, &["order", "1234"], DEFAULT_VERSION_PAD_WIDTH).unwrap(),
            "v00012.order.1234"
        );
    }

    #[test]
    fn test_compose_versioned_key_no_segments() {
        assert_eq!(compose_versioned_key(3, &[], 5).unwrap(), "v00003");
    }

    // === Validation ===

    #[test]
    fn test_empty_segment_rejected() {
        assert_eq!(compose_key(&["a", ""]), Err(KeyPathError::EmptySegment));
    }

    #[test]
    fn test_separator_in_segment_rejected() {
        let result = compose_key(&["a.b"]);
        assert_eq!(
            result,
            Err(KeyPathError::SeparatorInSegment {
                segment: "a.b".to_string()
            })
        );
    }

    // === Ordering law ===

    #[test]
    fn test_padded_versions_sort_numerically() {
        let earlier = versioned_key_prefix(9, 5);
        let later = versioned_key_prefix(10, 5);
        assert!(earlier < later, "{earlier} should sort before {later}");
    }

    proptest! {
        #[test]
        fn prop_versioned_prefix_order_matches_numeric_order(
            a in 0u64..99999,
            b in 0u64..99999,
        ) {
            let pa = versioned_key_prefix(a, DEFAULT_VERSION_PAD_WIDTH);
            let pb = versioned_key_prefix(b, DEFAULT_VERSION_PAD_WIDTH);
            prop_assert_eq!(a.cmp(&b), pa.cmp(&pb));
        }

        #[test]
        fn prop_compose_splits_back_into_segments(
            segments in proptest::collection::vec("[a-z0-9#-]{1,12}", 1..6)
        ) {
            let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
            let composed = compose_key(&refs).unwrap();
            let split: Vec<&str> = composed.split(KEY_SEGMENT_SEPARATOR).collect();
            prop_assert_eq!(split, refs);
        }
    }
}
