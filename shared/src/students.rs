use lambda_http::Body;
use serde_json::{json, Value};

use crate::auth::{self, CredentialUpdate};
use crate::error::ApiError;
use crate::http::parse_body;
use crate::organizations::{attach_org_names, org_name};
use crate::store::{row_str, to_row, Filter, Row, Table, TableStore};
use crate::types::{is_plausible_email, CreateStudentRequest, Role, UpdateStudentRequest};

/// Create a student profile and its login credential.
pub async fn add_student(store: &dyn TableStore, body: &Body) -> Result<Value, ApiError> {
    let req: CreateStudentRequest = parse_body(body)?;
    tracing::info!("Attempting to add student: {}", req.email);

    if !is_plausible_email(&req.email) {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    auth::ensure_email_available(store, &req.email).await?;

    // Only the marks that were supplied become columns.
    let mut profile = to_row(Table::Students, &req.marks)?;
    profile.insert("name".into(), req.name.clone().into());
    profile.insert("org_id".into(), req.org_id.into());
    profile.insert("language".into(), req.language.into());
    profile.insert("email".into(), req.email.clone().into());

    let student = store.insert(Table::Students, profile).await?;
    let student_id = row_str(&student, "id").unwrap_or_default();

    if let Err(e) =
        auth::create_credential(store, &req.name, &req.email, &req.password, Role::Student).await
    {
        tracing::error!("Failed to create credential for {}; removing student profile", req.email);
        if let Err(rollback) = store
            .delete(Table::Students, &Filter::new().eq("id", student_id.as_str()))
            .await
        {
            tracing::error!("Rollback of student {} failed: {:?}", student_id, rollback);
        }
        return Err(e);
    }

    tracing::info!("Student successfully added: {}", req.email);
    Ok(json!({ "success": true, "student_id": student_id }))
}

/// List students, optionally by organization and language.
pub async fn list_students(
    store: &dyn TableStore,
    org_id: Option<&str>,
    language: Option<&str>,
) -> Result<Value, ApiError> {
    tracing::info!("Listing students for org_id: {:?} language: {:?}", org_id, language);

    let mut filter = Filter::new();
    let mut name = None;
    if let Some(org_id) = org_id {
        filter = filter.eq("org_id", org_id);
        name = org_name(store, org_id).await?;
    }
    if let Some(language) = language {
        filter = filter.eq("language", language);
    }

    let students = store.find(Table::Students, &filter).await?;
    let students = attach_org_names(store, students).await?;

    Ok(json!({ "students": students, "org_name": name }))
}

/// Student profile by its `id`.
pub async fn find_student(store: &dyn TableStore, student_id: &str) -> Result<Row, ApiError> {
    store
        .find_one(Table::Students, &Filter::new().eq("id", student_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))
}

pub async fn get_student(store: &dyn TableStore, student_id: &str) -> Result<Value, ApiError> {
    let student = find_student(store, student_id).await?;
    Ok(json!({ "student": student }))
}

pub async fn update_student(
    store: &dyn TableStore,
    student_id: &str,
    body: &Body,
) -> Result<Value, ApiError> {
    let req: UpdateStudentRequest = parse_body(body)?;
    let existing = find_student(store, student_id).await?;

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

    let mut patch = to_row(Table::Students, &req.marks)?;
    if let Some(name) = &req.name {
        patch.insert("name".into(), name.as_str().into());
    }
    if let Some(language) = &req.language {
        patch.insert("language".into(), language.as_str().into());
    }
    if let Some(email) = new_email {
        patch.insert("email".into(), email.into());
    }

    let updated = store
        .update(Table::Students, &Filter::new().eq("id", student_id), patch)
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

    Ok(json!({ "success": true, "student": updated }))
}

pub async fn delete_student(store: &dyn TableStore, student_id: &str) -> Result<Value, ApiError> {
    let student = find_student(store, student_id).await?;

    store
        .delete(Table::Students, &Filter::new().eq("id", student_id))
        .await?;
    if let Some(email) = row_str(&student, "email") {
        auth::delete_credential(store, &email).await?;
    }

    Ok(json!({ "success": true, "message": "Student deleted successfully" }))
}
