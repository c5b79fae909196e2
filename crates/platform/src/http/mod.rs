//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! HTTP layer — Axum-based REST API in front of the CA domain engine.
//!
//! Provides:
//! - Unified router combining the CA hierarchy routes and an ambient
//!   health check.
//! - Handlers: create/get/revoke entity, CA record, CRL, cert/key export.
//! - AppState and Config for service wiring.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::Config;
pub use router::create_router;
pub use state::AppState;
