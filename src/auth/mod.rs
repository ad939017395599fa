use std::env;
use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// The authenticated caller, as verified by the identity provider's token.
/// Name and email ride along so bookings can snapshot contact details.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub role: String,
    pub name: String,
    pub email: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: String,
    pub name: String,
    pub email: String,
    pub exp: usize,
}

/// HS256 key pair shared with the identity provider. Issuing tokens is the
/// provider's job; `issue` exists for tests and local tooling.
#[derive(Clone)]
pub struct JwtConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtConfig {
    pub fn from_secret(secret: &str) -> Self {
        JwtConfig {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        JwtConfig::from_secret(&secret)
    }

    pub fn issue(&self, id: i64, role: &str, name: &str, email: &str) -> String {
        let claims = Claims {
            sub: id,
            role: role.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .expect("HS256 token encoding cannot fail")
    }

    fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    ApiError::Unauthenticated("Token expired. Please login again.".into())
                }
                _ => ApiError::Unauthenticated("Invalid token.".into()),
            },
        )?;
        Ok(AuthUser {
            id: data.claims.sub,
            role: data.claims.role,
            name: data.claims.name,
            email: data.claims.email,
        })
    }
}

fn user_from_request(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let config = req
        .app_data::<web::Data<JwtConfig>>()
        .ok_or_else(|| ApiError::Unauthenticated("Authentication is not configured.".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            ApiError::Unauthenticated("Access denied. No token provided. Please login.".into())
        })?;

    config.verify(token)
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<AuthUser, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(user_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_back_to_the_same_user() {
        let config = JwtConfig::from_secret("unit-test-secret");
        let token = config.issue(7, "admin", "Ana", "ana@example.com");
        let user = config.verify(&token).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.role, "admin");
        assert_eq!(user.email, "ana@example.com");
        assert!(user.is_admin());
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let config = JwtConfig::from_secret("unit-test-secret");
        let other = JwtConfig::from_secret("some-other-secret");
        let token = other.issue(7, "user", "Ana", "ana@example.com");
        assert!(config.verify(&token).is_err());
    }
}
