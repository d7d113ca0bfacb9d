use std::time::Duration;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use super::claims::Claims;
use crate::{config::JwtConfig, error::ApiError, state::AppState, store::User};

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
        }
    }

    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.auth.keys().clone()
    }
}

/// Verified claims from a `Bearer` token.
pub struct AuthUser(pub Claims);

/// Like [`AuthUser`], but the token must carry `isAdmin: true`.
pub struct AdminUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                Err(ApiError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin {
            warn!(user_id = %claims.id, "admin route refused");
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use time::macros::date;
    use uuid::Uuid;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 60 * 24,
        })
    }

    fn user(is_admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Ana Lopez".into(),
            username: "ana".into(),
            email: "ana@example.com".into(),
            password_hash: "unused".into(),
            birthday: date!(1990 - 02 - 28),
            is_admin,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    async fn extract<T>(keys: &JwtKeys, header: Option<&str>) -> Result<T, ApiError>
    where
        T: FromRequestParts<JwtKeys, Rejection = ApiError>,
    {
        let mut req = Request::builder().uri("/");
        if let Some(h) = header {
            req = req.header(axum::http::header::AUTHORIZATION, h);
        }
        let (mut parts, _) = req.body(()).unwrap().into_parts();
        T::from_request_parts(&mut parts, keys).await
    }

    #[test]
    fn token_carries_identity_claims() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let u = user(true);
        let token = keys.sign(&u).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.id, u.id);
        assert_eq!(claims.full_name, "Ana Lopez");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.username, "ana");
        assert!(claims.is_admin);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn claims_serialize_in_camel_case() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.sign(&user(false)).unwrap();
        let claims = keys.verify(&token).unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("fullName").is_some());
        assert_eq!(json["isAdmin"], serde_json::json!(false));
    }

    #[test]
    fn verify_rejects_other_secret_issuer_or_audience() {
        let token = make_keys("secret", "iss", "aud").sign(&user(false)).unwrap();
        assert!(make_keys("other", "iss", "aud").verify(&token).is_err());
        assert!(make_keys("secret", "bad-iss", "aud").verify(&token).is_err());
        assert!(make_keys("secret", "iss", "bad-aud").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("secret", "iss", "aud");
        let mut claims = keys.verify(&keys.sign(&user(false)).unwrap()).unwrap();
        // well past the default 60s leeway
        claims.exp = claims.iat - 3600;
        let stale = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&stale).is_err());
    }

    #[tokio::test]
    async fn extractor_requires_bearer_token() {
        let keys = make_keys("secret", "iss", "aud");
        let err = extract::<AuthUser>(&keys, None).await.err().unwrap();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err = extract::<AuthUser>(&keys, Some("Basic abc")).await.err().unwrap();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err = extract::<AuthUser>(&keys, Some("Bearer garbage")).await.err().unwrap();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let u = user(false);
        let header = format!("Bearer {}", keys.sign(&u).unwrap());
        let AuthUser(claims) = extract::<AuthUser>(&keys, Some(&header)).await.ok().unwrap();
        assert_eq!(claims.id, u.id);
    }

    #[tokio::test]
    async fn admin_extractor_checks_flag() {
        let keys = make_keys("secret", "iss", "aud");
        let plain = format!("Bearer {}", keys.sign(&user(false)).unwrap());
        let err = extract::<AdminUser>(&keys, Some(&plain)).await.err().unwrap();
        assert!(matches!(err, ApiError::Forbidden));

        let admin = format!("Bearer {}", keys.sign(&user(true)).unwrap());
        assert!(extract::<AdminUser>(&keys, Some(&admin)).await.is_ok());
    }
}
