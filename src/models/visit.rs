use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Primary key of the single `visit_counter` row
pub const COUNTER_ROW_ID: i64 = 1;

/// Sentinel used when a request carries no client IP or user-agent
pub const UNKNOWN_CLIENT: &str = "unknown";

/// The (client IP, user-agent) pair visits are deduplicated on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub ip: String,
    pub user_agent: String,
}

impl ClientIdentity {
    /// Build an identity, substituting `"unknown"` for missing parts
    pub fn new(ip: Option<&str>, user_agent: Option<&str>) -> Self {
        Self {
            ip: non_blank(ip).unwrap_or(UNKNOWN_CLIENT).to_string(),
            user_agent: non_blank(user_agent).unwrap_or(UNKNOWN_CLIENT).to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct VisitRecord {
    pub ip: String,
    pub user_agent: String,
    /// Epoch seconds of the most recent counted visit
    pub last_visit_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub count: i64,
    pub counter_rows: i64,
    pub record_rows: i64,
}

/// Result of one count-and-classify call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOutcome {
    pub count: i64,
    pub is_mobile: bool,
    /// False when the identity was already counted inside the window
    pub admitted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitCountResponse {
    pub count: i64,
    pub is_mobile: bool,
}

impl From<VisitOutcome> for VisitCountResponse {
    fn from(outcome: VisitOutcome) -> Self {
        Self {
            count: outcome.count,
            is_mobile: outcome.is_mobile,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisitErrorResponse {
    pub count: i64,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub name: String,
}
