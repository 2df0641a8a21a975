//! HTTP API endpoints for the PortGate engine.
//!
//! The engine trusts the identity it is handed: the upstream gateway
//! resolves authentication and passes `X-Actor-Id` / `X-Actor-Role`
//! headers, which the [`Caller`] extractor turns into an
//! [`ActorContext`].

pub mod admissions;
pub mod bookings;
pub mod slots;

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use portgate_core::{ActorContext, ActorId, Role};
use uuid::Uuid;

/// Extractor for the trusted caller identity headers.
pub struct Caller(pub ActorContext);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get("x-actor-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.parse::<Uuid>().ok())
            .ok_or_else(|| ApiError::bad_request("missing or malformed X-Actor-Id header"))?;
        let role = parts
            .headers
            .get("x-actor-role")
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.parse::<Role>().ok())
            .ok_or_else(|| ApiError::bad_request("missing or malformed X-Actor-Role header"))?;
        Ok(Self(ActorContext::new(ActorId::from_uuid(actor_id), role)))
    }
}
