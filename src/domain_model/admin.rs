use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single administrator allowed to edit the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentity {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
