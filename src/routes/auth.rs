use axum::Extension;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;
use tracing::instrument;

use crate::controllers::user::{NewUser, verify_password};
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request::{ChangePassword, ForgotPassword, Login, Register};
use crate::types::response::ApiResponse;
use crate::types::user::{AuthorizedUser, UserProfile};
use crate::utils::auth::bearer_token;
use crate::utils::extract::JsonBody;
use crate::utils::params::non_blank;

#[derive(Debug, Serialize)]
pub(crate) struct Registered {
    user: UserProfile,
    token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoggedIn {
    wallet_balance: f64,
    user: UserProfile,
    token: String,
}

/// Passwords are compared verbatim, so only emptiness counts as missing.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// New password and confirmation must be present, long enough and equal.
fn new_password<'a>(
    state: &AppState,
    new_password: Option<&'a str>,
    confirm_password: Option<&str>,
    missing: &str,
) -> Result<&'a str, Error> {
    let (Some(new_password), Some(confirm_password)) = (new_password, confirm_password) else {
        return Err(Error::bad_request(missing));
    };

    state.user_controller.validate_password(new_password)?;

    if new_password != confirm_password {
        return Err(Error::bad_request(
            "New password and confirmation do not match",
        ));
    }

    Ok(new_password)
}

#[instrument(skip_all)]
pub(crate) async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Register>,
) -> Result<ApiResponse<Registered>, Error> {
    let (Some(first_name), Some(last_name), Some(username), Some(email), Some(password)) = (
        non_blank(body.first_name.as_deref()),
        non_blank(body.last_name.as_deref()),
        non_blank(body.username.as_deref()),
        non_blank(body.email.as_deref()),
        present(&body.password),
    ) else {
        return Err(Error::bad_request(
            "Missing required fields: firstName, lastName, username, email, password",
        ));
    };

    let user = state
        .user_controller
        .register(NewUser {
            first_name,
            last_name,
            username,
            email,
            phone: non_blank(body.phone.as_deref()),
            password,
        })
        .await?;

    let token = state.session_controller.create_user_session(user.id).await?;

    tracing::info!("Registered user {}", user.id);

    Ok(ApiResponse::ok(
        Registered { user, token },
        "User registered successfully",
    ))
}

#[instrument(skip_all)]
pub(crate) async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Login>,
) -> Result<ApiResponse<LoggedIn>, Error> {
    let (Some(email), Some(password)) = (non_blank(body.email.as_deref()), present(&body.password))
    else {
        return Err(Error::bad_request("Missing required fields: email, password"));
    };

    state.user_controller.validate_email(email)?;

    let credentials = state
        .user_controller
        .login(email, password)
        .await?
        .ok_or(Error::Unauthorized("Invalid email or password"))?;

    let token = state
        .session_controller
        .create_user_session(credentials.id)
        .await?;

    let user = state
        .user_controller
        .profile(credentials.id)
        .await?
        .ok_or_else(|| Error::upstream("Failed to retrieve user profile", "profile missing"))?;

    Ok(ApiResponse::ok(
        LoggedIn {
            wallet_balance: user.wallet_balance,
            user,
            token,
        },
        "Login successful",
    ))
}

#[instrument(skip_all)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
) -> Result<ApiResponse<()>, Error> {
    state
        .session_controller
        .delete_user_session(user.session_id)
        .await?;

    Ok(ApiResponse::message("Logout successful"))
}

#[instrument(skip_all)]
pub(crate) async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
) -> Result<ApiResponse<UserProfile>, Error> {
    let profile = state
        .user_controller
        .profile(user.id)
        .await?
        .ok_or_else(|| Error::not_found("User profile not found"))?;

    Ok(ApiResponse::ok(profile, "User data retrieved successfully"))
}

#[instrument(skip_all)]
pub(crate) async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
    JsonBody(body): JsonBody<ChangePassword>,
) -> Result<ApiResponse<()>, Error> {
    let missing = "Missing required fields: oldPassword, newPassword, confirmPassword";

    let Some(old_password) = present(&body.old_password) else {
        return Err(Error::bad_request(missing));
    };
    let password = new_password(
        &state,
        present(&body.new_password),
        present(&body.confirm_password),
        missing,
    )?;

    let credentials = state
        .user_controller
        .credentials_by_id(user.id)
        .await?
        .ok_or(Error::Unauthorized("Invalid user session"))?;

    if !verify_password(old_password, &credentials.password_hash)? {
        return Err(Error::Unauthorized("Current password is incorrect"));
    }

    state.user_controller.update_password(user.id, password).await?;
    state
        .session_controller
        .revoke_user_sessions(user.id, Some(user.session_id))
        .await?;

    Ok(ApiResponse::message("Password changed successfully"))
}

/// Resets by email (only when unverified resets are allowed) or by old
/// password under a bearer session.
#[instrument(skip_all)]
pub(crate) async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<ForgotPassword>,
) -> Result<ApiResponse<()>, Error> {
    let password = new_password(
        &state,
        present(&body.new_password),
        present(&body.confirm_password),
        "Missing required fields: newPassword, confirmPassword",
    )?;

    if let Some(email) = non_blank(body.email.as_deref()) {
        state.user_controller.validate_email(email)?;

        if !state.allow_unverified_password_reset {
            return Err(Error::forbidden(
                "Password reset by email is not enabled",
            ));
        }

        let credentials = state
            .user_controller
            .credentials_by_email(email)
            .await?
            .ok_or_else(|| Error::bad_request("User not found with this email"))?;

        state
            .user_controller
            .update_password(credentials.id, password)
            .await?;
        state
            .session_controller
            .revoke_user_sessions(credentials.id, None)
            .await?;

        tracing::info!("Password reset by email for user {}", credentials.id);

        return Ok(ApiResponse::message("Password reset successfully"));
    }

    let Some(old_password) = present(&body.old_password) else {
        return Err(Error::bad_request(
            "Either email or oldPassword must be provided",
        ));
    };

    let token = bearer_token(&headers).ok_or(Error::Unauthorized(
        "Authorization header required for password-based reset",
    ))?;
    let user = state.session_controller.verify_user_session(token).await?;

    let credentials = state
        .user_controller
        .credentials_by_id(user.id)
        .await?
        .ok_or(Error::Unauthorized("Invalid or expired token"))?;

    if !verify_password(old_password, &credentials.password_hash)? {
        return Err(Error::Unauthorized("Current password is incorrect"));
    }

    state.user_controller.update_password(user.id, password).await?;
    state
        .session_controller
        .revoke_user_sessions(user.id, Some(user.session_id))
        .await?;

    Ok(ApiResponse::message("Password changed successfully"))
}

#[instrument(skip_all)]
pub(crate) async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
) -> Result<ApiResponse<()>, Error> {
    state.user_controller.delete(user.id).await?;

    tracing::info!("Deleted account {}", user.id);

    Ok(ApiResponse::message("Account deleted successfully"))
}
