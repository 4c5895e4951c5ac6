/// User domain type
use serde::{Deserialize, Serialize};

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier (also used as the filename prefix)
    pub id: i64,

    /// Login name
    pub username: String,

    /// Email given at registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
