use serde::{Deserialize, Serialize};

/// Claims carried by a signed session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Expiry, unix seconds.
    pub exp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: SessionClaims,
}

/// Login result. The token is also set as the session cookie; it is returned
/// for clients that send it as a bearer token instead.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: SessionClaims,
    pub token: String,
}
