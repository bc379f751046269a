use crate::error::{AppError, Result, USER_NOT_FOUND};
use crate::extract::JsonBody;
use crate::models::{AuthenticateRequest, BalanceResponse, RegisterUserRequest, UserResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// POST /api/users/authenticate
pub async fn authenticate_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AuthenticateRequest>,
) -> Result<Json<UserResponse>> {
    let user = state
        .user_service
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(user.into()))
}

/// POST /api/users
pub async fn register_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = state.user_service.register(request).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/users/{id}/balance
pub async fn balance_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BalanceResponse>> {
    let user = state
        .user_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::BadRequest(USER_NOT_FOUND.to_string()))?;

    let balance = state.entry_service.balance(user.id).await?;

    Ok(Json(BalanceResponse {
        user: user.id,
        balance,
    }))
}
