use std::ops::Range;

/// Status codes treated as a successful response.
///
/// Defaults to any `2xx`. [`SuccessCodes::strict`] only accepts `200 OK`.
#[derive(Debug, Clone)]
pub struct SuccessCodes {
    ranges: Vec<StatusCodeRange>,
}

#[derive(Debug, Clone)]
enum StatusCodeRange {
    Single(u16),
    Exclusive(Range<u16>),
}

impl SuccessCodes {
    /// Any `2xx` status.
    pub fn new() -> Self {
        Self {
            ranges: vec![StatusCodeRange::Exclusive(200..300)],
        }
    }

    /// Only `200 OK`.
    pub fn strict() -> Self {
        Self::from_single(200)
    }

    /// Creates success codes from a single status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code is invalid (outside 100-599).
    pub fn from_single(status: u16) -> Self {
        assert!(
            (100..=599).contains(&status),
            "HTTP status code must be between 100 and 599, got {status}"
        );

        Self {
            ranges: vec![StatusCodeRange::Single(status)],
        }
    }

    /// Checks if a status code counts as a success.
    pub fn contains(&self, status: u16) -> bool {
        self.ranges.iter().any(|range| match range {
            StatusCodeRange::Single(single) => *single == status,
            StatusCodeRange::Exclusive(range) => range.contains(&status),
        })
    }
}

impl Default for SuccessCodes {
    fn default() -> Self {
        Self::new()
    }
}
