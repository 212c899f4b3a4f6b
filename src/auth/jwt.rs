use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

use super::claims::Claims;

/// Signing and verification keys for the two token families.
///
/// Access and refresh tokens are signed with distinct secrets, so a token of
/// one family can never pass verification as the other.
#[derive(Clone)]
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            access_secret,
            refresh_secret,
            access_ttl_minutes,
            refresh_ttl_days,
        } = state.config.jwt.clone();
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl: Duration::from_secs((access_ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((refresh_ttl_days as u64) * 24 * 60 * 60),
        }
    }
}

impl TokenKeys {
    fn sign(&self, user_id: Uuid, key: &EncodingKey, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, key)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign(user_id, &self.access_encoding, self.access_ttl)
    }
    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign(user_id, &self.refresh_encoding, self.refresh_ttl)
    }

    fn verify(&self, token: &str, key: &DecodingKey) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, key, &Validation::default())?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    /// Stateless check against the access secret; never touches the store.
    pub fn verify_access(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify(token, &self.access_decoding)
    }
    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify(token, &self.refresh_decoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> TokenKeys {
        let state = AppState::fake();
        TokenKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign access");
        let claims = keys.verify_access(&token).expect("verify access");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn sign_and_verify_refresh_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_refresh(user_id).expect("sign refresh");
        let claims = keys.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, user_id);
    }

    #[tokio::test]
    async fn access_token_is_not_a_valid_refresh_token() {
        let keys = make_keys();
        let token = keys.sign_access(Uuid::new_v4()).expect("sign access");
        assert!(keys.verify_refresh(&token).is_err());
    }

    #[tokio::test]
    async fn refresh_token_is_not_a_valid_access_token() {
        let keys = make_keys();
        let token = keys.sign_refresh(Uuid::new_v4()).expect("sign refresh");
        assert!(keys.verify_access(&token).is_err());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        // Expired beyond the default 60s leeway.
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now.unix_timestamp() - 300) as usize,
            exp: (now.unix_timestamp() - 120) as usize,
        };
        let token =
            encode(&Header::default(), &claims, &keys.access_encoding).expect("encode expired");
        assert!(keys.verify_access(&token).is_err());
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let keys = make_keys();
        assert!(keys.verify_access("not.a.jwt").is_err());
    }
}
