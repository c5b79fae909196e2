//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Basic Manager (C4) — the policy layer. Not concurrency-safe on its own;
//! [`crate::ca::transactional::TransactionalManager`] wraps it.
//!
//! Operations are parameterized by [`Role`] rather than duplicated three
//! times per role, per the redesign note carried from the design doc:
//! one issuance function, one lookup function, one revocation function.

use num_bigint::BigUint;
use pkid_types::{CaEntity, Entity, Role};
use tracing::{debug, info};

use super::codec;
use super::crl;
use super::error::{ManagerError, ManagerResult};
use super::generator::{self, Options, Usage};
use super::storage::Storage;

pub struct BasicManager<S> {
    storage: S,
}

impl<S: Storage> BasicManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a new entity of `role` under `parent_id` (empty for a root CA).
    ///
    /// `parent_id` being non-empty but failing to load falls through to
    /// self-signed issuance, matching the source behavior the design doc
    /// preserves as lenient rather than tightened.
    pub fn create_entity(&mut self, parent_id: &str, role: Role, mut options: Options) -> ManagerResult<String> {
        match role {
            Role::Ca => options.is_ca = true,
            Role::Client => options.usage = Usage::ClientAuth,
            Role::Server => options.usage = Usage::ServerAuth,
        }

        let parent = if parent_id.is_empty() {
            None
        } else {
            self.storage.load_ca(parent_id).ok()
        };

        let mut entity = generator::generate(parent.as_ref(), options)?;
        let new_id = self.storage.new_id();
        entity.id = new_id.clone();
        let entity_name = entity.name.clone();

        match role {
            Role::Ca => {
                let ca = CaEntity::new(entity);
                self.storage.save_ca(&ca)?;
            }
            Role::Client | Role::Server => {
                self.storage.save_entity(role, &entity)?;
            }
        }
        info!(role = %role, id = %new_id, "issued entity");

        if let Some(mut parent) = parent {
            parent.serial += BigUint::from(1u32);
            parent.children_mut(role).insert(new_id.clone(), entity_name);
            self.storage.save_ca(&parent)?;
            debug!(parent = %parent.id(), serial = %parent.serial, "parent serial advanced");
        }

        Ok(new_id)
    }

    pub fn get_entity(&self, role: Role, id: &str) -> ManagerResult<Entity> {
        match role {
            Role::Ca => Ok(self.storage.load_ca(id)?.entity),
            Role::Client | Role::Server => Ok(self.storage.load_entity(role, id)?),
        }
    }

    /// The full CA record, including its issuance counter and child maps.
    pub fn get_ca(&self, id: &str) -> ManagerResult<CaEntity> {
        Ok(self.storage.load_ca(id)?)
    }

    /// Mark `child_id` (of `role`, under `parent_id`) revoked and append its
    /// certificate serial to the parent's `Revoked` list.
    ///
    /// Does not verify `child_id` is actually a direct child of `parent_id`
    /// (any caller who knows both IDs can revoke into any CA), and does not
    /// de-duplicate repeat revocations of the same child — both preserved
    /// as-is per the design doc's Open Question decisions.
    pub fn revoke_entity(&mut self, parent_id: &str, role: Role, child_id: &str) -> ManagerResult<()> {
        let mut parent = self.storage.load_ca(parent_id)?;

        let serial = match role {
            Role::Ca => {
                let mut child = self.storage.load_ca(child_id)?;
                let serial = extract_serial(&child.entity)?;
                child.entity.is_revoked = true;
                self.storage.save_ca(&child)?;
                serial
            }
            Role::Client | Role::Server => {
                let mut child = self.storage.load_entity(role, child_id)?;
                let serial = extract_serial(&child)?;
                child.is_revoked = true;
                self.storage.save_entity(role, &child)?;
                serial
            }
        };

        parent.revoked.push(serial);
        self.storage.save_ca(&parent)?;
        info!(parent = %parent_id, role = %role, child = %child_id, "revoked entity");
        Ok(())
    }

    /// Sign and PEM-encode a CRL for `ca_id`, with one entry per serial in
    /// its `Revoked` list, in append order.
    pub fn get_crl(&self, ca_id: &str) -> ManagerResult<String> {
        let ca = self.storage.load_ca(ca_id)?;
        let (cert, key) = codec::parse(&ca.entity.cert, &ca.entity.key)?;
        let pem = crl::build(&cert, &key, &ca.revoked)?;
        Ok(pem)
    }
}

fn extract_serial(entity: &Entity) -> ManagerResult<BigUint> {
    let (cert, _key) = codec::parse(&entity.cert, &entity.key)?;
    let bytes = cert.tbs_certificate.serial_number.as_bytes();
    Ok(BigUint::from_bytes_be(bytes))
}
