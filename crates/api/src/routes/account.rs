//! Account endpoints

use auth::{hash_password, verify_password};
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use data_validator::required;
use mailer::templates::verification_email;
use serde::{Deserialize, Serialize};
use storage::{Account, AccountChanges, NewAccount, StorageError};
use tower_governor::GovernorLayer;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthAccount};
use crate::rate_limit::{create_governor_config, RateLimitConfig};
use crate::response::ApiResponse;
use crate::state::{AppState, SharedState};

const MISSING_REGISTRATION: &str = "Missing email, name, or password";
const INVALID_CREDENTIALS_FORMAT: &str = "Email or password isn't valid";
const EMAIL_USED: &str = "Email already used";
const ACCOUNT_NOT_FOUND: &str = "Account not found";

pub fn router(rate_limit: &RateLimitConfig) -> Router<SharedState> {
    let mut credentials = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));
    if let Some(config) = create_governor_config(rate_limit) {
        credentials = credentials.layer(GovernorLayer { config });
    }

    Router::new()
        .merge(credentials)
        .route("/verify/:id", post(verify))
        .route(
            "/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
}

#[derive(Debug, Deserialize)]
pub struct AccountBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPayload {
    pub account: Account,
    pub token: String,
}

/// Validated account fields with the password still in clear text
struct AccountInput {
    name: String,
    email: String,
    password: String,
}

fn account_input(state: &AppState, body: &AccountBody) -> Result<AccountInput, ApiError> {
    let missing = |_| ApiError::bad_request(MISSING_REGISTRATION);
    let name = required("name", body.name.as_deref()).map_err(missing)?;
    let email = required("email", body.email.as_deref()).map_err(missing)?;
    let password = body
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request(MISSING_REGISTRATION))?;

    state
        .validator
        .validate_email(email)
        .and_then(|_| state.validator.validate_password(password))
        .map_err(|_| ApiError::bad_request(INVALID_CREDENTIALS_FORMAT))?;

    Ok(AccountInput {
        name: name.to_string(),
        email: email.to_lowercase(),
        password: password.to_string(),
    })
}

/// Argon2 is CPU-bound; keep it off the async workers
async fn hash_blocking(password: String) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    Ok(hash)
}

async fn register(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<AccountBody>,
) -> Result<ApiResponse<Account>, ApiError> {
    let input = account_input(&state, &body)?;

    if state.repo.account_by_email(&input.email).await?.is_some() {
        return Err(ApiError::bad_request(EMAIL_USED));
    }

    let password_hash = hash_blocking(input.password).await?;
    let account = state
        .repo
        .create_account(NewAccount {
            name: input.name,
            email: input.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StorageError::Conflict(_) => ApiError::bad_request(EMAIL_USED),
            other => other.into(),
        })?;

    let email = verification_email(
        &account.email,
        &account.name,
        &state.verification_link(account.id),
    );
    if let Err(e) = state.mailer.send(email).await {
        error!(
            "Verification email for account {} failed, removing account: {}",
            account.id, e
        );
        if let Err(cleanup) = state.repo.delete_account(account.id).await {
            warn!("Failed to remove account {}: {}", account.id, cleanup);
        }
        metrics::counter!("servilog_registrations_total", "outcome" => "mail_failed")
            .increment(1);
        return Err(e.into());
    }

    info!("Account {} registered", account.id);
    metrics::counter!("servilog_registrations_total", "outcome" => "created").increment(1);
    Ok(ApiResponse::created("Account created", account))
}

async fn login(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<LoginBody>,
) -> Result<ApiResponse<LoginPayload>, ApiError> {
    let missing = |_| ApiError::bad_request("Missing email or password");
    let email = required("email", body.email.as_deref()).map_err(missing)?;
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing email or password"))?;

    let invalid = || {
        metrics::counter!("servilog_logins_total", "outcome" => "rejected").increment(1);
        ApiError::not_found("Invalid email or password")
    };

    let account = state
        .repo
        .account_by_email(&email.to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    let hash = account.password_hash.clone();
    let matches =
        tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;
    if !matches {
        return Err(invalid());
    }

    if !account.is_verified {
        metrics::counter!("servilog_logins_total", "outcome" => "unverified").increment(1);
        return Err(ApiError::Unauthorized("Account isn't verified".to_string()));
    }

    let token = state
        .tokens
        .issue(account.id, &account.email, &account.name)?;
    info!("Account {} logged in", account.id);
    metrics::counter!("servilog_logins_total", "outcome" => "success").increment(1);
    Ok(ApiResponse::ok(
        "Login success",
        LoginPayload { account, token },
    ))
}

async fn verify(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Account>, ApiError> {
    let account = state
        .repo
        .account_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ACCOUNT_NOT_FOUND))?;
    if account.is_verified {
        return Err(ApiError::bad_request("Account already verified"));
    }

    let account = state
        .repo
        .mark_verified(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ACCOUNT_NOT_FOUND))?;
    info!("Account {} verified", id);
    Ok(ApiResponse::ok("Account verified", account))
}

async fn get_account(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Account>, ApiError> {
    auth.ensure_account(id)?;
    let account = state
        .repo
        .account_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ACCOUNT_NOT_FOUND))?;
    Ok(ApiResponse::ok("Account found", account))
}

async fn update_account(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<AccountBody>,
) -> Result<ApiResponse<Account>, ApiError> {
    auth.ensure_account(id)?;
    let input = account_input(&state, &body)?;

    if let Some(existing) = state.repo.account_by_email(&input.email).await? {
        if existing.id != id {
            return Err(ApiError::bad_request(EMAIL_USED));
        }
    }

    let password_hash = hash_blocking(input.password).await?;
    let account = state
        .repo
        .update_account(
            id,
            AccountChanges {
                name: input.name,
                email: input.email,
                password_hash,
            },
        )
        .await
        .map_err(|e| match e {
            StorageError::Conflict(_) => ApiError::bad_request(EMAIL_USED),
            other => other.into(),
        })?
        .ok_or_else(|| ApiError::not_found(ACCOUNT_NOT_FOUND))?;
    info!("Account {} updated", id);
    Ok(ApiResponse::ok("Account updated", account))
}

async fn delete_account(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Account>, ApiError> {
    auth.ensure_account(id)?;
    let account = state
        .repo
        .delete_account(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ACCOUNT_NOT_FOUND))?;
    info!("Account {} deleted", id);
    Ok(ApiResponse::ok("Account deleted", account))
}
