use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::error::Error;

/// Year of the first show listed on Phish.net.
pub const FIRST_SHOW_YEAR: i32 = 1983;

/// Number of shows at which `shows/query` stops returning further rows.
pub const SHOWS_QUERY_CAP: u64 = 300;

/// JSON wrapper around every v3 response.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Envelope {
    /// `0` on success. A missing code is treated as a failure.
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub response: ResponseBody,
}

impl Envelope {
    /// Fails with [`crate::error::Kind::Api`] unless `error_code` is present and `0`.
    pub fn into_checked(self) -> Result<Self> {
        if self.error_code != Some(0) {
            return Err(Error::api(
                self.error_code,
                self.error_message.unwrap_or_default(),
            ));
        }
        Ok(self)
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ResponseBody {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub data: Value,
}

impl ResponseBody {
    /// Flattens `data` into a list of records.
    ///
    /// Some endpoints return an array, others an object keyed by id.
    #[must_use]
    pub fn records(&self) -> Vec<Value> {
        match &self.data {
            Value::Array(items) => items.clone(),
            Value::Object(map) => map.values().cloned().collect(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.data {
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }
}

/// Shows returned by one or more `shows/query` calls.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shows {
    pub shows: Vec<Value>,
    /// Years whose query hit [`SHOWS_QUERY_CAP`] and may be missing shows.
    pub truncated_years: Vec<i32>,
}

impl Shows {
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        !self.truncated_years.is_empty()
    }
}

/// Result of fetching setlists for many shows.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Setlists {
    pub setlists: Vec<Value>,
    /// Show ids for which Phish.net has no setlist.
    pub missing: Vec<u64>,
}
