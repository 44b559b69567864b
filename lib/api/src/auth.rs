//! Session authentication.
//!
//! The session token comes from the `sessionid` cookie or an
//! `Authorization: Bearer <token>` header and is resolved against the
//! session store before the handler runs.

use crate::error::ApiError;
use crate::rest::ApiState;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use estatex_core::Error;
use estatex_storage::User;
use std::future::{ready, Ready};

pub const SESSION_COOKIE: &str = "sessionid";

/// The verified caller
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

impl AuthContext {
    pub fn user_id(&self) -> u64 {
        self.user.id
    }
}

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<AuthContext, ApiError> {
    let state = req
        .app_data::<web::Data<ApiState>>()
        .ok_or_else(|| ApiError(Error::Storage("session store is not configured".into())))?;

    let token = session_token(req).ok_or(ApiError(Error::Unauthenticated))?;
    let user_id = state
        .sessions
        .user_for_session(&token)?
        .ok_or(ApiError(Error::Unauthenticated))?;
    let user = state
        .sessions
        .get_user(user_id)?
        .ok_or(ApiError(Error::Unauthenticated))?;

    Ok(AuthContext { user })
}

impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
