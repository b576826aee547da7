//! Timecode normalization.
//!
//! Inference output mixes `M:SS`, `MM:SS` and `H:MM:SS` markers. Downstream
//! consumers (montage entries, spreadsheet export) expect the canonical
//! fixed-width `HH:MM:SS` form, so both parsers normalize through here.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Normalize a timecode string to `HH:MM:SS`.
///
/// A two-group input (`M:SS`) is read as minutes:seconds with the hour
/// forced to `00`; a three-group input has every group zero-padded to
/// width 2. Anything else is returned unchanged — callers treat a
/// non-8-character result as a soft-fail signal rather than an error.
///
/// # Examples
/// ```
/// use cutsheet_models::timecode::normalize;
/// assert_eq!(normalize("5:30"), "00:05:30");
/// assert_eq!(normalize("1:02:03"), "01:02:03");
/// assert_eq!(normalize("garbage"), "garbage");
/// ```
pub fn normalize(raw: &str) -> String {
    let parts: Vec<&str> = raw.split(':').collect();

    match parts.as_slice() {
        [minutes, seconds] => format!("00:{:0>2}:{:0>2}", minutes, seconds),
        [hours, minutes, seconds] => {
            format!("{:0>2}:{:0>2}:{:0>2}", hours, minutes, seconds)
        }
        _ => raw.to_string(),
    }
}

/// A canonical `HH:MM:SS` time marker.
///
/// Constructed through [`Timecode::normalize`], which applies the same
/// total normalization as [`normalize`]. `is_canonical` reports whether
/// the wrapped string actually reached the fixed-width form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Timecode(String);

impl Timecode {
    /// Normalize a raw timecode string into a `Timecode`.
    pub fn normalize(raw: &str) -> Self {
        Self(normalize(raw.trim()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the value is exactly three zero-padded 2-digit groups.
    pub fn is_canonical(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() == 8
            && bytes[2] == b':'
            && bytes[5] == b':'
            && [0, 1, 3, 4, 6, 7]
                .iter()
                .all(|&i| bytes[i].is_ascii_digit())
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Timecode> for String {
    fn from(tc: Timecode) -> Self {
        tc.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mm_ss() {
        assert_eq!(normalize("15:20"), "00:15:20");
        assert_eq!(normalize("5:07"), "00:05:07");
        assert_eq!(normalize("0:00"), "00:00:00");
    }

    #[test]
    fn test_normalize_hh_mm_ss() {
        assert_eq!(normalize("1:02:03"), "01:02:03");
        assert_eq!(normalize("12:34:56"), "12:34:56");
    }

    #[test]
    fn test_normalize_malformed_passthrough() {
        assert_eq!(normalize("garbage"), "garbage");
        assert_eq!(normalize("1:2:3:4"), "1:2:3:4");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["5:30", "15:20", "1:02:03", "12:34:56", "nonsense"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_width_invariant() {
        for raw in ["0:00", "5:30", "59:59", "1:00:00", "23:59:59"] {
            let tc = Timecode::normalize(raw);
            assert_eq!(tc.as_str().len(), 8);
            assert!(tc.is_canonical(), "not canonical: {}", tc);
        }
    }

    #[test]
    fn test_canonical_rejects_passthrough() {
        assert!(!Timecode::normalize("garbage").is_canonical());
        assert!(!Timecode::normalize("1:2:3:4").is_canonical());
    }
}
