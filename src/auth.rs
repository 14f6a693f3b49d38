use std::future::Future;
use std::pin::Pin;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::schema::{auth_sessions, user_profiles};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "buyer" => Some(Role::Buyer),
            "seller" => Some(Role::Seller),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("requires the {} role", required.as_str())]
    Denied { required: Role },
}

/// Proof that a request carried a valid, unexpired session.
///
/// This is the single authorization capability: handlers extract it once and
/// call [`AuthorizedSession::require`] for the role they need, instead of
/// re-fetching the profile and branching per route.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizedSession {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthorizedSession {
    /// Gate on a role. Admins pass every gate.
    pub fn require(&self, required: Role) -> Result<&Self, AuthError> {
        if self.role == required || self.role == Role::Admin {
            Ok(self)
        } else {
            Err(AuthError::Denied { required })
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Sessions are opaque UUID bearer tokens provisioned by the external
/// identity provider into `auth_sessions`; this service only validates them.
fn bearer_token(req: &HttpRequest) -> Option<Uuid> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

fn load_session(pool: &DbPool, token: Uuid) -> Result<Option<AuthorizedSession>, AppError> {
    let mut conn = pool.get()?;

    let row: Option<(Uuid, String)> = auth_sessions::table
        .inner_join(user_profiles::table)
        .filter(auth_sessions::token.eq(token))
        .filter(auth_sessions::expires_at.gt(Utc::now()))
        .select((user_profiles::id, user_profiles::role))
        .first(&mut conn)
        .optional()?;

    Ok(row.and_then(|(user_id, role)| {
        Role::parse(&role).map(|role| AuthorizedSession { user_id, role })
    }))
}

impl FromRequest for AuthorizedSession {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, AppError>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let pool = pool
                .ok_or_else(|| AppError::Internal("database pool is not configured".to_string()))?;
            let Some(token) = token else {
                return Err(AuthError::NotAuthenticated.into());
            };

            let session = web::block(move || load_session(&pool, token))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))??;

            session.ok_or_else(|| AuthError::NotAuthenticated.into())
        })
    }
}
