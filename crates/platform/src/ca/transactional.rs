//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Transactional Manager (C5) — wraps the Basic Manager in a single
//! process-wide mutual-exclusion primitive. Every public operation,
//! including read-only gets, executes inside the critical section: no
//! retries, no batching, no deadlock detection, since no operation
//! re-enters the Manager.

use pkid_types::{CaEntity, Entity, Role};
use tokio::sync::Mutex;

use super::error::ManagerResult;
use super::generator::Options;
use super::manager::BasicManager;
use super::storage::Storage;

pub struct TransactionalManager<S> {
    inner: Mutex<BasicManager<S>>,
}

impl<S: Storage> TransactionalManager<S> {
    pub fn new(storage: S) -> Self {
        Self {
            inner: Mutex::new(BasicManager::new(storage)),
        }
    }

    pub async fn create_entity(&self, parent_id: &str, role: Role, options: Options) -> ManagerResult<String> {
        self.inner.lock().await.create_entity(parent_id, role, options)
    }

    pub async fn get_entity(&self, role: Role, id: &str) -> ManagerResult<Entity> {
        self.inner.lock().await.get_entity(role, id)
    }

    pub async fn get_ca(&self, id: &str) -> ManagerResult<CaEntity> {
        self.inner.lock().await.get_ca(id)
    }

    pub async fn revoke_entity(&self, parent_id: &str, role: Role, child_id: &str) -> ManagerResult<()> {
        self.inner.lock().await.revoke_entity(parent_id, role, child_id)
    }

    pub async fn get_crl(&self, ca_id: &str) -> ManagerResult<String> {
        self.inner.lock().await.get_crl(ca_id)
    }
}
