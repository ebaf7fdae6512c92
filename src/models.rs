use crate::model::role::Role;
use serde::{Deserialize, Serialize};

/// JWT payload shared with the auth service that issues the tokens. This
/// service only verifies and reads it.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Email of the authenticated user
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}
