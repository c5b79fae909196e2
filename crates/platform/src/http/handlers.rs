//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! HTTP endpoint handlers for the pkid CA hierarchy routes.
//!
//! Every handler is a thin adapter over [`crate::ca::TransactionalManager`]:
//! parse the request, call the manager, translate the result (or error)
//! into the response shape spec'd in the design doc's route table.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Form;
use chrono::{DateTime, Utc};
use pkid_types::Role;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::ca::generator::{Curve, Options};
use crate::ca::ManagerError;

use super::state::AppState;

impl IntoResponse for ManagerError {
    fn into_response(self) -> Response {
        let status = match self {
            ManagerError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// GET /healthz
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

#[derive(Debug, Deserialize)]
pub struct CreateEntityForm {
    pub name: String,
    #[serde(rename = "rsaBits")]
    pub rsa_bits: Option<u32>,
    pub curve: Option<String>,
    #[serde(rename = "notBefore")]
    pub not_before: Option<i64>,
    #[serde(rename = "validFor")]
    pub valid_for: Option<String>,
}

impl CreateEntityForm {
    fn into_options(self) -> Result<Options, ManagerError> {
        let curve = match self.curve {
            Some(c) => Some(c.parse::<Curve>().map_err(|e| ManagerError::MalformedInput(e.to_string()))?),
            None => None,
        };
        let not_before = self
            .not_before
            .map(|secs| {
                DateTime::<Utc>::from_timestamp(secs, 0)
                    .ok_or_else(|| ManagerError::MalformedInput(format!("invalid notBefore {secs}")))
            })
            .transpose()?;
        let valid_for = match self.valid_for {
            Some(s) => parse_duration(&s)?,
            None => Options::default().valid_for,
        };

        Ok(Options {
            name: self.name,
            not_before,
            valid_for,
            rsa_bits: self.rsa_bits,
            curve,
            ..Options::default()
        })
    }
}

/// Parses a Go-style duration string: a non-negative integer followed by
/// one of `s`, `m`, `h`, or `d` (e.g. `"8760h"`).
fn parse_duration(s: &str) -> Result<chrono::Duration, ManagerError> {
    let s = s.trim();
    let (digits, unit) = s.split_at(s.len().saturating_sub(1));
    let amount: i64 = digits
        .parse()
        .map_err(|_| ManagerError::MalformedInput(format!("invalid validFor {s:?}")))?;
    match unit {
        "s" => Ok(chrono::Duration::seconds(amount)),
        "m" => Ok(chrono::Duration::minutes(amount)),
        "h" => Ok(chrono::Duration::hours(amount)),
        "d" => Ok(chrono::Duration::days(amount)),
        _ => Err(ManagerError::MalformedInput(format!(
            "invalid validFor unit in {s:?}, expected one of s/m/h/d"
        ))),
    }
}

fn parse_role(typ: &str) -> Result<Role, ManagerError> {
    typ.parse::<Role>()
        .map_err(|e| ManagerError::MalformedInput(e.to_string()))
}

/// POST /ca — create a self-signed root CA.
pub async fn create_ca_handler(
    State(state): State<AppState>,
    Form(form): Form<CreateEntityForm>,
) -> Result<String, ManagerError> {
    let options = form.into_options()?;
    let id = state.manager.create_entity("", Role::Ca, options).await?;
    info!(id = %id, "created root CA");
    Ok(id)
}

/// POST /ca/:ca/:typ — create a child of `ca` with role `typ`.
pub async fn create_child_handler(
    State(state): State<AppState>,
    Path((ca, typ)): Path<(String, String)>,
    Form(form): Form<CreateEntityForm>,
) -> Result<String, ManagerError> {
    let role = parse_role(&typ)?;
    let options = form.into_options()?;
    let id = state.manager.create_entity(&ca, role, options).await?;
    info!(parent = %ca, role = %role, id = %id, "created entity");
    Ok(id)
}

/// GET /ca/:ca — the CA record with `Cert`/`Key` elided.
pub async fn get_ca_handler(
    State(state): State<AppState>,
    Path(ca): Path<String>,
) -> Result<Json<pkid_types::CaEntity>, ManagerError> {
    let record = state.manager.get_ca(&ca).await?;
    Ok(Json(record.elided()))
}

/// GET /ca/:ca/:typ — the `id -> name` map for that child role.
pub async fn get_children_handler(
    State(state): State<AppState>,
    Path((ca, typ)): Path<(String, String)>,
) -> Result<Json<std::collections::BTreeMap<String, String>>, ManagerError> {
    let role = parse_role(&typ)?;
    let record = state.manager.get_ca(&ca).await?;
    Ok(Json(record.children(role).clone()))
}

/// GET /ca/:ca/:typ/:id/cert
pub async fn get_child_cert_handler(
    State(state): State<AppState>,
    Path((_ca, typ, id)): Path<(String, String, String)>,
) -> Result<String, ManagerError> {
    let role = parse_role(&typ)?;
    let entity = state.manager.get_entity(role, &id).await?;
    Ok(entity.cert)
}

/// GET /ca/:ca/:typ/:id/key
pub async fn get_child_key_handler(
    State(state): State<AppState>,
    Path((_ca, typ, id)): Path<(String, String, String)>,
) -> Result<String, ManagerError> {
    let role = parse_role(&typ)?;
    let entity = state.manager.get_entity(role, &id).await?;
    Ok(entity.key)
}

/// GET /ca/:ca/:typ/:id/revoke
pub async fn revoke_child_handler(
    State(state): State<AppState>,
    Path((ca, typ, id)): Path<(String, String, String)>,
) -> Result<&'static str, ManagerError> {
    let role = parse_role(&typ)?;
    state.manager.revoke_entity(&ca, role, &id).await?;
    info!(parent = %ca, role = %role, child = %id, "revoked via HTTP");
    Ok("revoked")
}

/// GET /ca/:ca/cert
pub async fn get_ca_cert_handler(
    State(state): State<AppState>,
    Path(ca): Path<String>,
) -> Result<String, ManagerError> {
    let entity = state.manager.get_entity(Role::Ca, &ca).await?;
    Ok(entity.cert)
}

/// GET /ca/:ca/key
pub async fn get_ca_key_handler(
    State(state): State<AppState>,
    Path(ca): Path<String>,
) -> Result<String, ManagerError> {
    let entity = state.manager.get_entity(Role::Ca, &ca).await?;
    Ok(entity.key)
}

/// GET /ca/:ca/crl
pub async fn get_crl_handler(
    State(state): State<AppState>,
    Path(ca): Path<String>,
) -> Result<String, ManagerError> {
    state.manager.get_crl(&ca).await
}
