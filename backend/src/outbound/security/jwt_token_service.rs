//! HS256 implementation of the `TokenService` port.

use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Username;
use crate::domain::ports::{TokenError, TokenService};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies `{sub, iat, exp}` tokens with a shared secret.
///
/// Expiry is checked against the injected clock with no leeway, so a token is
/// rejected from the second its `exp` is reached.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// HS256 signer and verifier over a shared `key`.
    pub fn new(key: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject: &Username, ttl: TimeDelta) -> Result<String, TokenError> {
        let issued_at = self.clock.utc();
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Username, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Self::validation()).map_err(|err| {
            debug!(error = %err, "token rejected");
            TokenError::invalid_token()
        })?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            debug!("token expired");
            return Err(TokenError::invalid_token());
        }
        Username::new(&data.claims.sub).map_err(|_| TokenError::invalid_token())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::test_support::clock::MutableClock;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::default())
    }

    fn ada() -> Username {
        Username::new("ada").expect("username")
    }

    #[rstest]
    fn issued_token_round_trips_subject(clock: Arc<MutableClock>) {
        let service = JwtTokenService::new(KEY, clock);
        let token = service.issue(&ada(), TimeDelta::minutes(30)).expect("issue");

        assert_eq!(service.verify(&token).expect("verify"), ada());
    }

    #[rstest]
    fn token_expires_exactly_at_exp(clock: Arc<MutableClock>) {
        let service = JwtTokenService::new(KEY, clock.clone());
        let token = service.issue(&ada(), TimeDelta::minutes(30)).expect("issue");

        clock.advance(TimeDelta::minutes(30) - TimeDelta::seconds(1));
        assert!(service.verify(&token).is_ok());

        clock.advance(TimeDelta::seconds(1));
        assert_eq!(service.verify(&token), Err(TokenError::InvalidToken));
    }

    #[rstest]
    fn token_signed_with_another_key_is_rejected(clock: Arc<MutableClock>) {
        let issuer = JwtTokenService::new(b"another-key-another-key-another!", clock.clone());
        let verifier = JwtTokenService::new(KEY, clock);
        let token = issuer.issue(&ada(), TimeDelta::minutes(30)).expect("issue");

        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidToken));
    }

    #[rstest]
    #[case("")]
    #[case("not.a.token")]
    #[case("eyJhbGciOiJIUzI1NiJ9.e30.c2lnbmF0dXJl")]
    fn malformed_tokens_are_rejected(clock: Arc<MutableClock>, #[case] token: &str) {
        let service = JwtTokenService::new(KEY, clock);

        assert_eq!(service.verify(token), Err(TokenError::InvalidToken));
    }

    #[rstest]
    fn token_without_subject_is_rejected(clock: Arc<MutableClock>) {
        let service = JwtTokenService::new(KEY, clock.clone());
        let now = clock.utc().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "iat": now, "exp": now + 600 }),
            &EncodingKey::from_secret(KEY),
        )
        .expect("encode");

        assert_eq!(service.verify(&token), Err(TokenError::InvalidToken));
    }
}
