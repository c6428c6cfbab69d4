use serde::{Deserialize, Serialize};

/// Recipient of the daily news summary. Only users with an email address are
/// ever materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}
