use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role_id: u8,
    pub full_name: String,
    /// Opaque random token encoded in the user's QR badge.
    pub qr_token: String,
    pub is_active: bool,
}
