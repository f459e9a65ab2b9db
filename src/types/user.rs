use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize, Serialize, Debug)]
pub(crate) struct Claims {
    pub(crate) exp: usize,
    pub(crate) iat: usize,
    pub(crate) sub: Uuid,
    pub(crate) jti: Uuid,
}

/// Inserted into request extensions once a bearer session checks out.
#[derive(Clone, Debug)]
pub(crate) struct AuthorizedUser {
    pub(crate) id: Uuid,
    pub(crate) session_id: Uuid,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct AuthorizedAdmin {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) full_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub(crate) struct UserProfile {
    pub(crate) id: Uuid,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) phone: Option<String>,
    pub(crate) wallet_balance: f64,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct Credentials {
    pub(crate) id: Uuid,
    pub(crate) password_hash: String,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct AdminCredentials {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminLogin {
    pub(crate) token: String,
    pub(crate) admin: AdminSummary,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminSummary {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) full_name: Option<String>,
    pub(crate) role: &'static str,
    pub(crate) expires_at: DateTime<Utc>,
}
