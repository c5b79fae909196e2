//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! AppState — shared state for the pkid HTTP layer: one transactional
//! manager behind an `Arc`, so every handler holds a cheap clone.

use std::sync::Arc;

use crate::ca::storage::Storage;
use crate::ca::TransactionalManager;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<TransactionalManager<Box<dyn Storage>>>,
}

impl AppState {
    pub fn new(manager: TransactionalManager<Box<dyn Storage>>) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }
}
