/// Suffix table for byte-like tokens, checked in order, first match wins.
///
/// Matching is case-sensitive, so `kB` (decimal kilobytes) and `KiB` never
/// collide, and the bare `B` entry only sees tokens none of the longer
/// suffixes claimed. Factors convert to megabytes.
pub const UNIT_TABLE: [(&str, f64); 7] = [
    ("GiB", 1073.74),
    ("MiB", 1.04858),
    ("KiB", 0.001024),
    ("GB", 1000.0),
    ("MB", 1.0),
    ("kB", 0.001),
    ("B", 1e-6),
];

/// Result of normalizing a single stats token
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Megabytes(f64),
    Raw(String),
}

impl Measurement {
    /// Numeric view of the measurement; raw tokens are parsed as plain numbers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Megabytes(value) => Some(*value).filter(|v| v.is_finite()),
            Self::Raw(token) => token.parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

/// Convert a unit-suffixed token (`512MiB`, `1.2GB`, `930kB`) to megabytes.
///
/// Tokens without a known suffix, or whose converted value is not a finite
/// non-negative number, come back untouched as [`Measurement::Raw`].
pub fn normalize(token: &str) -> Measurement {
    for (suffix, factor) in UNIT_TABLE {
        if let Some(prefix) = token.strip_suffix(suffix) {
            let megabytes = prefix.parse::<f64>().map(|value| value * factor);
            return match megabytes {
                Ok(value) if value.is_finite() && value >= 0.0 => Measurement::Megabytes(value),
                _ => Measurement::Raw(token.to_string()),
            };
        }
    }

    Measurement::Raw(token.to_string())
}
