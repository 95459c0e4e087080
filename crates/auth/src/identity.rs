use serde::{Deserialize, Serialize};

use stockroom_core::UserId;

/// The authenticated user as reported by `/auth/login/` and `/auth/user/`.
///
/// Treated as opaque apart from `is_staff`, which gates every mutating
/// affordance in the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(alias = "id")]
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
