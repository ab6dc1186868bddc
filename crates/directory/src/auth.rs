use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use entity::employee;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use time::Duration as TimeDuration;
use tracing::debug;

use crate::{
    AppState,
    error::{AppError, AppResult},
};

pub const SESSION_COOKIE: &str = "directory_session";
pub const LOGIN_PATH: &str = "/login";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
    pub secure_cookies: bool,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i32,
    pub exp: usize,
    pub iat: usize,
}

pub fn issue_token(employee_id: i32, config: &AuthConfig) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: employee_id,
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(token: &str, config: &AuthConfig) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow::anyhow!("hash error: {}", err))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn session_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(config.session_ttl_minutes))
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build())
}

/// Login page URL that returns to `next` once the employee signs in.
pub fn login_url(next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{}?{}", LOGIN_PATH, query)
}

/// Accepts only same-origin absolute paths as post-login targets. Browsers
/// drop tabs and newlines while parsing a URL, so control characters are
/// rejected along with `//` and backslashes.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim).filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && !n.chars().any(char::is_control)
    })
}

/// Identity of the employee behind the current request, rebuilt from the
/// session cookie on every request.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub employee_id: i32,
    pub username: String,
    pub is_admin: bool,
}

/// Proof that the current request passed [`check_admin`]. Directory mutations
/// require it.
#[derive(Debug)]
pub struct Admin {
    employee_id: i32,
}

impl Admin {
    pub fn employee_id(&self) -> i32 {
        self.employee_id
    }
}

pub fn check_admin(ctx: &RequestContext) -> AppResult<Admin> {
    if ctx.is_admin {
        Ok(Admin {
            employee_id: ctx.employee_id,
        })
    } else {
        Err(AppError::forbidden(format!(
            "employee {} is not an admin",
            ctx.employee_id
        )))
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        let login_required = || AppError::LoginRequired { next: next.clone() };

        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
            return Err(login_required());
        };
        let claims = match decode_token(&token, &state.auth) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "rejecting session token");
                return Err(login_required());
            }
        };
        let employee = employee::Entity::find_by_id(claims.sub)
            .one(state.db.as_ref())
            .await?
            .ok_or_else(login_required)?;
        Ok(Self {
            employee_id: employee.id,
            username: employee.username,
            is_admin: employee.is_admin,
        })
    }
}
