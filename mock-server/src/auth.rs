//! Company registration, login and password recovery.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiFailure;
use crate::extract::{CurrentCompany, FormPayload, Payload, QueryParams};
use crate::state::{AppState, CompanyRow, OtpRow, OtpStatus};

#[derive(Deserialize)]
pub struct RegisterCompany {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyOut {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub role: String,
}

impl From<&CompanyRow> for CompanyOut {
    fn from(row: &CompanyRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            username: row.username.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            role: row.role.clone(),
        }
    }
}

pub async fn register_company(
    State(state): State<AppState>,
    Payload(input): Payload<RegisterCompany>,
) -> Result<Json<CompanyOut>, ApiFailure> {
    let mut db = state.db.write().await;
    if db.company_by_username(&input.username).is_some() {
        return Err(ApiFailure::BadRequest("Username already exists".to_string()));
    }
    let row = CompanyRow {
        id: db.next_id(),
        name: input.name,
        username: input.username,
        email: input.email,
        phone: input.phone,
        password: input.password,
        role: input.role.unwrap_or_else(|| "user".to_string()),
    };
    tracing::info!(id = row.id, username = %row.username, "company registered");
    let out = CompanyOut::from(&row);
    db.companies.push(row);
    Ok(Json(out))
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    FormPayload(form): FormPayload<Credentials>,
) -> Result<Json<Value>, ApiFailure> {
    let mut db = state.db.write().await;
    let company = db
        .company_by_username(&form.username)
        .filter(|c| c.password == form.password)
        .cloned()
        .ok_or(ApiFailure::InvalidCredentials)?;
    let token = db.issue_token(company.id);
    Ok(Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "com_id": company.id,
        "role": company.role,
    })))
}

#[derive(Deserialize)]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
}

/// Changes the password of the token's company; `username` is ignored.
pub async fn change_password(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    Payload(input): Payload<ChangePassword>,
) -> Result<Json<Value>, ApiFailure> {
    let mut db = state.db.write().await;
    let row = db
        .companies
        .iter_mut()
        .find(|c| c.id == company.id)
        .ok_or_else(|| ApiFailure::NotFound("Company not found".to_string()))?;
    if row.password != input.old_password {
        return Err(ApiFailure::BadRequest("Incorrect old password".to_string()));
    }
    row.password = input.new_password;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

#[derive(Deserialize)]
pub struct ForgotPassword {
    pub username: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ForgotPassword>,
) -> Result<Json<Value>, ApiFailure> {
    let mut db = state.db.write().await;
    let email = db
        .company_by_username(&query.username)
        .map(|c| c.email.clone())
        .ok_or_else(|| ApiFailure::NotFound("User not found".to_string()))?;

    let otp = (Uuid::new_v4().as_u128() % 900_000 + 100_000).to_string();
    // Delivery is out of band; the log line is the only channel.
    tracing::info!(username = %query.username, %otp, "OTP issued");
    db.otps.push(OtpRow {
        username: query.username,
        otp,
        status: OtpStatus::Created,
    });
    Ok(Json(json!({ "message": "OTP sent", "email": email })))
}

#[derive(Deserialize)]
pub struct VerifyOtp {
    pub otp: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Payload(input): Payload<VerifyOtp>,
) -> Result<Json<Value>, ApiFailure> {
    let mut db = state.db.write().await;
    let entry = db
        .otps
        .iter_mut()
        .find(|o| o.otp == input.otp && o.status == OtpStatus::Created)
        .ok_or_else(|| ApiFailure::BadRequest("Invalid or expired OTP".to_string()))?;
    entry.status = OtpStatus::Verified;
    Ok(Json(json!({ "message": "OTP verified" })))
}

#[derive(Deserialize)]
pub struct ResetPassword {
    pub username: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Payload(input): Payload<ResetPassword>,
) -> Result<Json<Value>, ApiFailure> {
    let mut db = state.db.write().await;
    let otp_index = db
        .otps
        .iter()
        .rposition(|o| o.username == input.username && o.status == OtpStatus::Verified)
        .ok_or_else(|| ApiFailure::BadRequest("OTP not verified".to_string()))?;

    let company = db
        .companies
        .iter_mut()
        .find(|c| c.username == input.username)
        .ok_or_else(|| ApiFailure::NotFound("User not found".to_string()))?;
    company.password = input.new_password;
    db.otps[otp_index].status = OtpStatus::Used;
    Ok(Json(json!({ "message": "Password reset successful" })))
}
