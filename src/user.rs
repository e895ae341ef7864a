use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp_secret: Option<String>,
    pub two_factor_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn create<U, E>(
        username: U,
        email: E,
        password_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self
    where
        U: Into<String>,
        E: Into<String>,
    {
        UserRecord {
            username: username.into(),
            email: email.into(),
            password_hash,
            totp_secret: None,
            two_factor_enabled: false,
            created_at,
        }
    }
}
