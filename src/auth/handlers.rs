use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse},
        extractors::AuthUser,
        repo::CredentialError,
        services::validate_registration,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    if let Err(e) = validate_registration(&payload) {
        warn!(email = %payload.email, "invalid registration payload");
        return Err(e);
    }

    let user = match state.users.register(&payload.email, &payload.password).await {
        Ok(u) => u,
        Err(CredentialError::DuplicateEmail) => {
            warn!(email = %payload.email, "email already registered");
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered".into(),
            user: PublicUser {
                id: user.id,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = match state.users.verify(&payload.email, &payload.password).await {
        Ok(u) => u,
        Err(CredentialError::InvalidCredentials) => {
            warn!(email = %payload.email, "login rejected");
            return Err(AppError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.jwt.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse { token }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    // A token can outlive the in-memory store across restarts.
    let user = state.users.find_by_id(user_id).await.ok_or_else(|| {
        warn!(user_id = %user_id, "token subject not found");
        AppError::InvalidToken
    })?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}
