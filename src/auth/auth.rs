use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

/// Resolved caller identity, extracted from the bearer token before any
/// handler runs. The capability check for manager-only operations is
/// `require_manager`, composed explicitly in each handler.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => {
                return ready(Err(ApiError::Unauthorized(
                    "Access denied. No token provided.".into(),
                )));
            }
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(ApiError::Store)),
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ApiError::Unauthorized("Invalid token".into()))),
        };

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.sub,
            role: claims.role,
        }))
    }
}

impl AuthUser {
    pub fn require_manager(&self) -> Result<(), ApiError> {
        if self.role == Role::Manager {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Access denied. Manager role required.".into(),
            ))
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Claims;
    use actix_web::test::TestRequest;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn test_config() -> Config {
        Config {
            server_addr: "127.0.0.1:0".into(),
            database_url: "mysql://unused".into(),
            jwt_secret: "extractor-secret".into(),
            db_max_connections: 1,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
        }
    }

    fn issue(role: Role) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize
            + 900;
        let claims = Claims {
            user_id: 7,
            sub: "max@company.com".into(),
            role,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("extractor-secret".as_bytes()),
        )
        .unwrap()
    }

    #[actix_web::test]
    async fn test_extracts_identity_from_bearer_token() {
        let req = TestRequest::default()
            .app_data(Data::new(test_config()))
            .insert_header(("Authorization", format!("Bearer {}", issue(Role::Manager))))
            .to_http_request();

        let user = AuthUser::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.email, "max@company.com");
        assert!(user.require_manager().is_ok());
    }

    #[actix_web::test]
    async fn test_missing_header_is_unauthorized() {
        let req = TestRequest::default()
            .app_data(Data::new(test_config()))
            .to_http_request();

        let err = AuthUser::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[actix_web::test]
    async fn test_garbage_token_is_unauthorized() {
        let req = TestRequest::default()
            .app_data(Data::new(test_config()))
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_http_request();

        let err = AuthUser::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[actix_web::test]
    async fn test_employee_fails_manager_gate() {
        let req = TestRequest::default()
            .app_data(Data::new(test_config()))
            .insert_header(("Authorization", format!("Bearer {}", issue(Role::Employee))))
            .to_http_request();

        let user = AuthUser::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert!(!user.is_manager());
        assert!(matches!(
            user.require_manager(),
            Err(ApiError::Forbidden(_))
        ));
    }
}
