use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record is an open-ended key/value object as returned by the list endpoints
/// (databases, cluster admins, database users).
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Series is a named table of points, used for both writes and query results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub points: Vec<Vec<serde_json::Value>>,
}

impl Series {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            points: Vec::new(),
        }
    }

    /// Append one row. Values are not checked against `columns`.
    pub fn with_point(mut self, point: Vec<serde_json::Value>) -> Self {
        self.points.push(point);
        self
    }
}

/// TimePrecision is the unit timestamps are interpreted in for writes and queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePrecision {
    #[serde(rename = "s")]
    Second,
    #[serde(rename = "m")]
    Millisecond,
    #[serde(rename = "u")]
    Microsecond,
}

impl TimePrecision {
    /// Wire code sent as the `time_precision` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePrecision::Second => "s",
            TimePrecision::Millisecond => "m",
            TimePrecision::Microsecond => "u",
        }
    }
}

impl fmt::Display for TimePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time precision '{0}', expected one of s, m, u")]
pub struct ParsePrecisionError(pub String);

impl FromStr for TimePrecision {
    type Err = ParsePrecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(TimePrecision::Second),
            "m" => Ok(TimePrecision::Millisecond),
            "u" => Ok(TimePrecision::Microsecond),
            other => Err(ParsePrecisionError(other.to_string())),
        }
    }
}
