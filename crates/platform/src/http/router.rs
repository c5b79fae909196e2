//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Axum router composition for the pkid HTTP layer.
//!
//! Routes:
//!   POST  /ca                     — create a self-signed root CA
//!   POST  /ca/:ca/:typ            — create a child (ca|client|server)
//!   GET   /ca/:ca                 — CA record, Cert/Key elided
//!   GET   /ca/:ca/:typ            — id -> name map for that role
//!   GET   /ca/:ca/:typ/:id/cert   — child PEM cert
//!   GET   /ca/:ca/:typ/:id/key    — child PEM key
//!   GET   /ca/:ca/:typ/:id/revoke — revoke that child
//!   GET   /ca/:ca/cert            — CA's own PEM cert
//!   GET   /ca/:ca/key             — CA's own PEM key
//!   GET   /ca/:ca/crl             — CA's PEM CRL
//!   GET   /healthz                — liveness check

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    handlers::{
        create_ca_handler, create_child_handler, get_ca_cert_handler, get_ca_handler, get_ca_key_handler,
        get_child_cert_handler, get_child_key_handler, get_children_handler, get_crl_handler, health_handler,
        revoke_child_handler,
    },
    state::AppState,
};

/// Build the base router with routes shared across all feature configurations.
pub fn build_base_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ca", post(create_ca_handler))
        .route("/ca/:ca/:typ", post(create_child_handler).get(get_children_handler))
        .route("/ca/:ca", get(get_ca_handler))
        .route("/ca/:ca/cert", get(get_ca_cert_handler))
        .route("/ca/:ca/key", get(get_ca_key_handler))
        .route("/ca/:ca/crl", get(get_crl_handler))
        .route("/ca/:ca/:typ/:id/cert", get(get_child_cert_handler))
        .route("/ca/:ca/:typ/:id/key", get(get_child_key_handler))
        .route("/ca/:ca/:typ/:id/revoke", get(revoke_child_handler))
}

/// Compose the full Axum router for the pkid service.
pub fn create_router(state: AppState) -> Router {
    build_base_router()
        .with_state(state)
        .layer(CorsLayer::new())
        .layer(TraceLayer::new_for_http())
}
