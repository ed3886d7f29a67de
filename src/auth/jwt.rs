use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::models::{Claims, TokenType};

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs() as usize
}

fn build_claims(
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    ttl: usize,
    token_type: TokenType,
) -> Claims {
    Claims {
        user_id,
        sub: username,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id,
    }
}

fn sign(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_access_token(
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = build_claims(user_id, username, role, employee_id, ttl, TokenType::Access);
    sign(&claims, secret)
}

/// Refresh tokens also return their claims so the jti can be persisted.
pub fn generate_refresh_token(
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
    let claims = build_claims(user_id, username, role, employee_id, ttl, TokenType::Refresh);
    let token = sign(&claims, secret)?;
    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips() {
        let token =
            generate_access_token(7, "ayesha".into(), 2, Some(42), "test-secret", 600).unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "ayesha");
        assert_eq!(claims.role, 2);
        assert_eq!(claims.employee_id, Some(42));
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(1, "x".into(), 1, None, "secret-a", 600).unwrap();
        assert!(verify_token(&token, "secret-b").is_err());
    }

    #[test]
    fn refresh_claims_expose_jti() {
        let (token, claims) =
            generate_refresh_token(1, "x".into(), 1, None, "secret", 600).unwrap();
        assert!(!claims.jti.is_empty());
        let decoded = verify_token(&token, "secret").unwrap();
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.token_type, TokenType::Refresh);
    }
}
