// Authentication extractors
// Decision: Header-based bearer tokens only; the UI keeps its own session
// Decision: In "none" mode, a fixed dev organizer context is used

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gatherpoll_core::AuthenticatedUser;
use serde::Serialize;
use std::sync::Arc;

use super::{
    config::{AuthConfig, AuthMode},
    jwt::JwtService,
};

/// Authentication error
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Authentication method used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication (dev organizer)
    None,
    /// JWT access token
    Jwt,
}

/// Authenticated organizer context extracted from request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub auth_method: AuthMethod,
}

impl AuthUser {
    /// Fixed organizer for no-auth mode
    pub fn dev_organizer() -> Self {
        Self {
            id: "user_dev".to_string(),
            email: "organizer@localhost".to_string(),
            name: "Dev Organizer".to_string(),
            auth_method: AuthMethod::None,
        }
    }

    /// Identity handed to the poll engine
    pub fn to_authenticated(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: Some(self.name.clone()).filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub jwt_service: Arc<JwtService>,
}

impl AuthState {
    pub fn new(config: AuthConfig) -> Self {
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        Self {
            config,
            jwt_service,
        }
    }
}

/// Helper trait for extracting AuthState from application state
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AuthState> for AuthState {
    fn from_ref(input: &AuthState) -> Self {
        input.clone()
    }
}

/// Extractor for the authenticated organizer
/// This is required - returns 401 if not authenticated
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        extract_auth_user(parts, &auth_state)
    }
}

fn extract_auth_user(parts: &Parts, auth_state: &AuthState) -> Result<AuthUser, AuthError> {
    if auth_state.config.mode == AuthMode::None {
        return Ok(AuthUser::dev_organizer());
    }

    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Err(AuthError::unauthorized("Authentication required"));
    };
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::unauthorized("Invalid authorization header"))?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::unauthorized("Bearer token required"))?;

    validate_jwt_token(token, auth_state)
}

fn validate_jwt_token(token: &str, auth_state: &AuthState) -> Result<AuthUser, AuthError> {
    let claims = auth_state
        .jwt_service
        .validate_access_token(token)
        .map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            AuthError::unauthorized("Invalid or expired token")
        })?;

    Ok(AuthUser {
        id: claims.sub,
        email: claims.email,
        name: claims.name,
        auth_method: AuthMethod::Jwt,
    })
}
