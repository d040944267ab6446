//! Credential verification and session issuance.
//!
//! `authenticate` is the single login path: look up the credential record,
//! verify the password hash, resolve the caller's organization from the
//! profile table matching their role, and sign a session token.

use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{bearer_token, parse_body, respond};
use crate::password::hash_password;
use crate::session::{SessionClaims, SessionSigner};
use crate::store::{row_str, Filter, Row, Table, TableStore};
use crate::types::{CredentialRecord, Role};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: Role,
    pub username: String,
    pub org_id: Option<String>,
    pub redirect: String,
}

/// Client-side landing page for a role.
pub fn redirect_for(role: &Role) -> &'static str {
    match role {
        Role::Individual => "/individual",
        _ => "/organization",
    }
}

/// Look up the credential record for an exact email match.
pub async fn find_credential(
    store: &dyn TableStore,
    email: &str,
) -> Result<Option<CredentialRecord>, ApiError> {
    match store
        .find_one(Table::Credentials, &Filter::new().eq("email", email))
        .await?
    {
        Some(row) => Ok(Some(serde_json::from_value(Value::Object(row))?)),
        None => Ok(None),
    }
}

pub async fn find_credential_by_id(
    store: &dyn TableStore,
    id: &str,
) -> Result<Option<CredentialRecord>, ApiError> {
    match store
        .find_one(Table::Credentials, &Filter::new().eq("id", id))
        .await?
    {
        Some(row) => Ok(Some(serde_json::from_value(Value::Object(row))?)),
        None => Ok(None),
    }
}

/// Organization the caller belongs to, per role. A missing profile row
/// yields `None`, never an error.
pub async fn resolve_org_id(
    store: &dyn TableStore,
    role: &Role,
    email: &str,
) -> Result<Option<String>, ApiError> {
    let (table, column) = match role {
        Role::Admin => (Table::Admins, "org_id"),
        Role::Student => (Table::Students, "org_id"),
        Role::Org => (Table::Organizations, "id"),
        Role::Individual | Role::Other(_) => return Ok(None),
    };

    let row = store
        .find_one(table, &Filter::new().eq("email", email))
        .await?;
    let org_id = row.as_ref().and_then(|r| row_str(r, column));
    if org_id.is_none() {
        tracing::warn!("No {} profile with an organization for {}", table.name(), email);
    }
    Ok(org_id)
}

pub async fn authenticate(
    store: &dyn TableStore,
    sessions: &SessionSigner,
    email: &str,
    password: &str,
) -> Result<LoginResponse, ApiError> {
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("email and password are required".to_string()));
    }

    let Some(credential) = find_credential(store, email).await? else {
        tracing::info!("Login rejected: no credential for {}", email);
        return Err(ApiError::InvalidCredentials);
    };

    if !crate::password::verify_password(password, &credential.password) {
        tracing::info!("Login rejected: password mismatch for {}", email);
        return Err(ApiError::InvalidCredentials);
    }

    let org_id = resolve_org_id(store, &credential.role, &credential.email).await?;
    let access_token = sessions.issue(&credential.id, &credential.email, &credential.role)?;

    tracing::info!("Login succeeded for {} ({})", email, credential.role);
    Ok(LoginResponse {
        access_token,
        redirect: redirect_for(&credential.role).to_string(),
        role: credential.role,
        username: credential.username,
        org_id,
    })
}

/// Handle `POST /auth/login`.
pub async fn login(state: &AppState, body: &Body) -> Result<Response<Body>, Error> {
    tracing::info!("Login request received");
    let request: LoginRequest = match parse_body(body) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };

    let result = authenticate(
        state.store.as_ref(),
        &state.sessions,
        &request.email,
        &request.password,
    )
    .await;
    respond(StatusCode::OK, result)
}

/// Claims of the bearer token on a request.
pub fn session_from_request(state: &AppState, event: &Request) -> Result<SessionClaims, ApiError> {
    let token = bearer_token(event)
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication info".to_string()))?;
    state.sessions.verify(token)
}

// ========== CREDENTIAL WRITES ==========

/// Fail with 400 if a credential already uses `email`.
///
/// A plain lookup: it does not reserve the email against a concurrent insert.
pub async fn ensure_email_available(store: &dyn TableStore, email: &str) -> Result<(), ApiError> {
    if find_credential(store, email).await?.is_some() {
        tracing::info!("Email {} already exists", email);
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }
    Ok(())
}

/// Store a new credential with a hashed password.
pub async fn create_credential(
    store: &dyn TableStore,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<Row, ApiError> {
    let mut row = Row::new();
    row.insert("username".into(), username.into());
    row.insert("email".into(), email.into());
    row.insert("password".into(), hash_password(password)?.into());
    row.insert("role".into(), String::from(role).into());
    Ok(store.insert(Table::Credentials, row).await?)
}

/// Changes to mirror onto a credential after its profile was edited.
#[derive(Debug, Default)]
pub struct CredentialUpdate<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
}

/// Apply `update` to the credential currently keyed by `email`.
pub async fn sync_credential(
    store: &dyn TableStore,
    email: &str,
    update: CredentialUpdate<'_>,
) -> Result<(), ApiError> {
    let mut patch = Row::new();
    if let Some(username) = update.username {
        patch.insert("username".into(), username.into());
    }
    if let Some(new_email) = update.email {
        patch.insert("email".into(), new_email.into());
    }
    if let Some(password) = update.password.filter(|p| !p.trim().is_empty()) {
        patch.insert("password".into(), hash_password(password)?.into());
    }
    if patch.is_empty() {
        return Ok(());
    }
    store
        .update(Table::Credentials, &Filter::new().eq("email", email), patch)
        .await?;
    Ok(())
}

pub async fn delete_credential(store: &dyn TableStore, email: &str) -> Result<(), ApiError> {
    store
        .delete(Table::Credentials, &Filter::new().eq("email", email))
        .await?;
    Ok(())
}
