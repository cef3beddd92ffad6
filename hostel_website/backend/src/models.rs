use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct OccupancyChange {
    #[validate(range(min = 1))]
    pub count: u32,
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceToggle {
    pub enabled: bool,
}

/// Body of a cleaning report, the server clock is used when no time is given
#[derive(Debug, Default, Deserialize)]
pub struct CleaningReport {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl CleaningReport {
    /// An empty body is a report without timestamp, anything else must be
    /// valid JSON.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}
