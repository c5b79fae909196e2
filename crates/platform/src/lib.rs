//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! pkid Platform — the certificate authority domain engine.
//!
//! This crate provides:
//! - `ca` module (feature `ca`): entity codec, certificate generator, storage
//!   backends, and the basic/transactional managers.
//! - `http` module (feature `http`): the Axum HTTP surface in front of the
//!   transactional manager.

#[cfg(feature = "ca")]
pub mod ca;

#[cfg(feature = "http")]
pub mod http;
