//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Service configuration: storage URI, listen address, and the bearer
//! token used by remote storage backends. CLI flags (see `pkid-server`)
//! take precedence; these are the environment-variable fallbacks.

use anyhow::Result;
use std::env;

/// Runtime configuration for the pkid service.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_uri: String,
    pub listen: String,
    pub token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let storage_uri = env::var("PKID_STORAGE")
            .unwrap_or_else(|_| "leveldb:///usr/share/pkid/datastore".to_string());
        let listen = env::var("PKID_LISTEN").unwrap_or_else(|_| "0.0.0.0:80".to_string());
        let token = env::var("PKID_TOKEN").ok();

        Ok(Config {
            storage_uri,
            listen,
            token,
        })
    }
}
