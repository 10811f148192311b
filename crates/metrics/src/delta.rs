//! Delta counter naming convention
//!
//! A counter registered under a name starting with the delta marker is
//! reported as the change since the previous flush instead of its absolute
//! value. The marker is stripped before the wire name is built.

/// Marker prefix for delta counters (INCREMENT, U+2206)
pub const DELTA_PREFIX: &str = "\u{2206}";

/// Alternate marker accepted on input (GREEK CAPITAL LETTER DELTA, U+0394)
pub const ALT_DELTA_PREFIX: &str = "\u{0394}";

/// Registration name for a delta counter called `name`
///
/// Names that already carry a marker are returned unchanged.
pub fn delta_counter_name(name: &str) -> String {
    if is_delta_counter(name) {
        name.to_string()
    } else {
        format!("{DELTA_PREFIX}{name}")
    }
}

/// Whether `name` carries a delta marker
pub fn is_delta_counter(name: &str) -> bool {
    name.starts_with(DELTA_PREFIX) || name.starts_with(ALT_DELTA_PREFIX)
}

/// `name` without its delta marker
pub fn strip_delta_marker(name: &str) -> &str {
    name.strip_prefix(DELTA_PREFIX)
        .or_else(|| name.strip_prefix(ALT_DELTA_PREFIX))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_counter_name() {
        assert_eq!(delta_counter_name("foo"), "\u{2206}foo");
        assert_eq!(delta_counter_name("\u{2206}foo"), "\u{2206}foo");
        assert_eq!(delta_counter_name("\u{0394}foo"), "\u{0394}foo");
    }

    #[test]
    fn test_is_delta_counter() {
        assert!(is_delta_counter("\u{2206}foo"));
        assert!(is_delta_counter("\u{0394}foo"));
        assert!(!is_delta_counter("foo"));
        assert!(!is_delta_counter(""));
    }

    #[test]
    fn test_strip_delta_marker() {
        assert_eq!(strip_delta_marker("\u{2206}foo"), "foo");
        assert_eq!(strip_delta_marker("\u{0394}foo"), "foo");
        assert_eq!(strip_delta_marker("foo"), "foo");
        assert_eq!(strip_delta_marker("\u{2206}"), "");
    }
}
