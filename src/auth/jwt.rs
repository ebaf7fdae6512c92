use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Verifies a token issued by the external auth service (HS256, shared
/// secret). Signature, expiry, and claim shape are all checked here.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
