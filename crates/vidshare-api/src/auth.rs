//! Thin identity adapter: registers users and issues the bearer tokens the
//! rest of the API trusts. Only the public profile projection ever leaves
//! the store.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{extract::State, http::StatusCode, response::Response};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use tracing::info;
use uuid::Uuid;

use vidshare_db::{Database, is_unique_violation};
use vidshare_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::{ApiError, ApiResult, respond};
use crate::extract::ApiJson;
use crate::guard::non_blank;
use crate::{AppState, run_blocking};

/// Create the user and return its id.
pub fn register_user(db: &Database, req: &RegisterRequest) -> ApiResult<Uuid> {
    let username = req.username.trim().to_lowercase();
    if username.len() < 3 || username.len() > 32 {
        return Err(ApiError::InvalidInput(
            "Username must be between 3 and 32 characters".into(),
        ));
    }
    if req.password.len() < 8 {
        return Err(ApiError::InvalidInput(
            "Password must be at least 8 characters".into(),
        ));
    }
    let full_name = non_blank(Some(req.full_name.as_str()))
        .ok_or_else(|| ApiError::InvalidInput("Full name is required".into()))?;
    let avatar = non_blank(req.avatar.as_deref()).unwrap_or_default();

    if db.get_user_by_username(&username)?.is_some() {
        return Err(ApiError::Conflict("Username is already taken".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4();
    // The pre-check above can race a concurrent registration; the UNIQUE
    // constraint is the final word.
    db.create_user(user_id, &username, full_name, avatar, &password_hash)
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Username is already taken".into())
            } else {
                ApiError::Store(e)
            }
        })?;

    info!("Registered user {} ({})", username, user_id);
    Ok(user_id)
}

/// Check credentials and return `(user id, username)`.
pub fn verify_login(db: &Database, req: &LoginRequest) -> ApiResult<(Uuid, String)> {
    let username = req.username.trim().to_lowercase();
    let user = db
        .get_user_by_username(&username)?
        .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("corrupt password hash for {}: {}", user.id, e))?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt user id '{}': {}", user.id, e))?;
    Ok((user_id, user.username))
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Response> {
    let username = req.username.trim().to_lowercase();
    let user_id = run_blocking(&state, move |db| register_user(db, &req)).await?;
    let token = create_token(&state.jwt_secret, user_id, &username)?;

    Ok(respond(
        StatusCode::CREATED,
        RegisterResponse { user_id, token },
        "User registered successfully",
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Response> {
    let (user_id, username) = run_blocking(&state, move |db| verify_login(db, &req)).await?;
    let token = create_token(&state.jwt_secret, user_id, &username)?;

    Ok(respond(
        StatusCode::OK,
        LoginResponse {
            user_id,
            username,
            token,
        },
        "User logged in successfully",
    ))
}
