use serde::Serialize;
use setup::session::{AuthType, Principal};
use uuid::Uuid;

/// The authenticated caller as reported by the userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfoResp {
    pub user_id: Uuid,
    pub email: String,
    pub auth_type: AuthType,
}

impl From<&Principal> for UserInfoResp {
    fn from(principal: &Principal) -> Self {
        Self {
            user_id: principal.user_id(),
            email: principal.email().to_string(),
            auth_type: principal.auth_type(),
        }
    }
}
