//! HS256 bearer tokens.
//!
//! Tokens are `header.payload.signature`, each part base64url without padding. The
//! signature is HMAC-SHA256 over `header.payload` keyed with the configured secret.

use crate::models::Principal;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TokenError {
    #[error("invalid Authorization header format")]
    Header,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("unsupported token algorithm {0}")]
    Algorithm(String),
    #[error("token signature mismatch")]
    Signature,
    #[error("token expired at {exp}")]
    Expired { exp: i64 },
    #[error("signing key rejected")]
    Key,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub exp: i64,
}

impl Claims {
    pub fn new(account_id: i32, username: String, ttl_hours: i64) -> Self {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp();
        Self {
            sub: account_id,
            username,
            exp,
        }
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            account_id: claims.sub,
            username: claims.username,
        }
    }
}

fn mac(secret: &[u8], signing_input: &str) -> Result<HmacSha256, TokenError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::Key)?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

fn encode_part<T: Serialize>(part: &T) -> Result<String, TokenError> {
    serde_json::to_vec(part)
        .map(|json| URL_SAFE_NO_PAD.encode(json))
        .map_err(|err| TokenError::Malformed(err.to_string()))
}

fn decode_part<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, TokenError> {
    let json = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|err| TokenError::Malformed(err.to_string()))?;
    serde_json::from_slice(&json).map_err(|err| TokenError::Malformed(err.to_string()))
}

pub fn issue_token(claims: &Claims, secret: &[u8]) -> Result<String, TokenError> {
    let header = Header {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
    };
    let signing_input = format!("{}.{}", encode_part(&header)?, encode_part(claims)?);
    let signature = mac(secret, &signing_input)?.finalize().into_bytes();

    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

/// Checks structure, algorithm, signature and expiry against `now` (unix seconds).
pub fn verify_token(token: &str, secret: &[u8], now: i64) -> Result<Claims, TokenError> {
    let malformed = || TokenError::Malformed("expected header.payload.signature".to_string());
    let (signing_input, signature) = token.rsplit_once('.').ok_or_else(malformed)?;
    let (header, payload) = signing_input.split_once('.').ok_or_else(malformed)?;
    if payload.contains('.') {
        return Err(malformed());
    }

    let header: Header = decode_part(header)?;
    if header.alg != ALGORITHM {
        return Err(TokenError::Algorithm(header.alg));
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|err| TokenError::Malformed(err.to_string()))?;
    mac(secret, signing_input)?
        .verify_slice(&signature)
        .map_err(|_| TokenError::Signature)?;

    let claims: Claims = decode_part(payload)?;
    if claims.exp < now {
        return Err(TokenError::Expired { exp: claims.exp });
    }

    Ok(claims)
}

pub fn extract_bearer_token(authorization: &str) -> Result<&str, TokenError> {
    let mut parts = authorization.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(TokenError::Header),
    }
}
