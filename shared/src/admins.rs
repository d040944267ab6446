use lambda_http::Body;
use serde_json::{json, Value};

use crate::auth::{self, CredentialUpdate};
use crate::error::ApiError;
use crate::http::parse_body;
use crate::organizations::{attach_org_names, org_name};
use crate::store::{row_str, Filter, Row, Table, TableStore};
use crate::types::{is_plausible_email, CreateAdminRequest, Role, UpdateAdminRequest};

/// Create an admin profile and its login credential.
pub async fn add_admin(store: &dyn TableStore, body: &Body) -> Result<Value, ApiError> {
    let req: CreateAdminRequest = parse_body(body)?;
    tracing::info!("Attempting to add admin: {}", req.email);

    if !is_plausible_email(&req.email) {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    auth::ensure_email_available(store, &req.email).await?;

    let mut profile = Row::new();
    profile.insert("name".into(), req.name.clone().into());
    profile.insert("org_id".into(), req.org_id.into());
    profile.insert("role".into(), req.role.into());
    profile.insert("contact".into(), req.contact.into());
    profile.insert("language".into(), req.language.into());
    profile.insert("email".into(), req.email.clone().into());

    let admin = store.insert(Table::Admins, profile).await?;
    let admin_id = row_str(&admin, "id").unwrap_or_default();

    if let Err(e) = auth::create_credential(store, &req.name, &req.email, &req.password, Role::Admin).await {
        tracing::error!("Failed to create credential for {}; removing admin profile", req.email);
        if let Err(rollback) = store.delete(Table::Admins, &Filter::new().eq("id", admin_id.as_str())).await {
            tracing::error!("Rollback of admin {} failed: {:?}", admin_id, rollback);
        }
        return Err(e);
    }

    tracing::info!("Admin successfully added: {}", req.email);
    Ok(json!({ "success": true, "admin_id": admin_id }))
}

/// List admins, optionally restricted to one organization.
pub async fn list_admins(store: &dyn TableStore, org_id: Option<&str>) -> Result<Value, ApiError> {
    tracing::info!("Listing admins for org_id: {:?}", org_id);

    let (filter, name) = match org_id {
        Some(org_id) => (Filter::new().eq("org_id", org_id), org_name(store, org_id).await?),
        None => (Filter::new(), None),
    };
    let admins = store.find(Table::Admins, &filter).await?;
    let admins = attach_org_names(store, admins).await?;

    Ok(json!({ "admins": admins, "org_name": name }))
}

async fn find_admin(store: &dyn TableStore, admin_id: &str) -> Result<Row, ApiError> {
    store
        .find_one(Table::Admins, &Filter::new().eq("id", admin_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))
}

pub async fn get_admin(store: &dyn TableStore, admin_id: &str) -> Result<Value, ApiError> {
    let admin = find_admin(store, admin_id).await?;
    Ok(json!({ "admin": admin }))
}

/// Patch an admin profile and mirror name, email and password onto the
/// credential.
pub async fn update_admin(store: &dyn TableStore, admin_id: &str, body: &Body) -> Result<Value, ApiError> {
    let req: UpdateAdminRequest = parse_body(body)?;
    let existing = find_admin(store, admin_id).await?;

    let old_email = row_str(&existing, "email");
    let new_email = req.email.as_deref().filter(|e| !e.is_empty());
    if let Some(email) = new_email {
        if !is_plausible_email(email) {
            return Err(ApiError::BadRequest("Invalid email address".to_string()));
        }
        if old_email.as_deref() != Some(email) {
            auth::ensure_email_available(store, email).await?;
        }
    }

    let mut patch = Row::new();
    for (field, value) in [
        ("name", &req.name),
        ("role", &req.role),
        ("contact", &req.contact),
        ("language", &req.language),
    ] {
        if let Some(v) = value {
            patch.insert(field.into(), v.as_str().into());
        }
    }
    if let Some(email) = new_email {
        patch.insert("email".into(), email.into());
    }

    let updated = store
        .update(Table::Admins, &Filter::new().eq("id", admin_id), patch)
        .await?
        .into_iter()
        .next()
        .unwrap_or_else(|| existing.clone());

    if let Some(old_email) = old_email {
        auth::sync_credential(
            store,
            &old_email,
            CredentialUpdate {
                username: req.name.as_deref(),
                email: new_email,
                password: req.password.as_deref(),
            },
        )
        .await?;
    }

    Ok(json!({ "success": true, "admin": updated }))
}

/// Delete an admin profile and its credential.
pub async fn delete_admin(store: &dyn TableStore, admin_id: &str) -> Result<Value, ApiError> {
    let admin = find_admin(store, admin_id).await?;

    store
        .delete(Table::Admins, &Filter::new().eq("id", admin_id))
        .await?;
    if let Some(email) = row_str(&admin, "email") {
        auth::delete_credential(store, &email).await?;
    }

    Ok(json!({ "success": true, "message": "Admin deleted successfully" }))
}
