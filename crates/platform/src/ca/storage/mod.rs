//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Persistence Port (C3) — the minimal capability the Manager programs
//! against: a fresh-ID generator plus full-record upsert/load for each of
//! the three roles.
//!
//! Two backends are provided: [`file::FileStorage`] (one YAML file per
//! entity under `cas/`, `clients/`, `servers/`) and
//! [`leveldb::LevelDbStorage`] (an embedded ordered key-value store, keys
//! `{role}::{id}`). [`open`] picks one from a `file://` or `leveldb://` URI.

pub mod file;
pub mod leveldb;

use pkid_types::{CaEntity, Entity, Role};

use super::error::StorageResult;

/// The persistence capability the Manager programs against.
///
/// Implementations offer no transactional guarantees beyond the atomicity
/// of a single `save_*`/`load_*` call; cross-record invariants (e.g.
/// keeping a parent's child map in step with the child store) are the
/// Manager's responsibility. Methods are synchronous: both backends do
/// blocking I/O, and the Transactional Manager (C5) already serializes
/// every call behind a single `tokio::sync::Mutex`, so there is no
/// concurrency for an `async fn` here to buy back.
pub trait Storage: Send + Sync {
    /// A fresh, globally unique entity ID (version-4 UUID).
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn save_ca(&self, ca: &CaEntity) -> StorageResult<()>;
    fn load_ca(&self, id: &str) -> StorageResult<CaEntity>;

    fn save_client(&self, entity: &Entity) -> StorageResult<()>;
    fn load_client(&self, id: &str) -> StorageResult<Entity>;

    fn save_server(&self, entity: &Entity) -> StorageResult<()>;
    fn load_server(&self, id: &str) -> StorageResult<Entity>;

    fn save_entity(&self, role: Role, entity: &Entity) -> StorageResult<()> {
        match role {
            Role::Ca => unreachable!("CA entities are saved via save_ca, which carries extra fields"),
            Role::Client => self.save_client(entity),
            Role::Server => self.save_server(entity),
        }
    }

    fn load_entity(&self, role: Role, id: &str) -> StorageResult<Entity> {
        match role {
            Role::Ca => unreachable!("CA entities are loaded via load_ca, which carries extra fields"),
            Role::Client => self.load_client(id),
            Role::Server => self.load_server(id),
        }
    }
}

impl Storage for Box<dyn Storage> {
    fn new_id(&self) -> String {
        (**self).new_id()
    }

    fn save_ca(&self, ca: &CaEntity) -> StorageResult<()> {
        (**self).save_ca(ca)
    }

    fn load_ca(&self, id: &str) -> StorageResult<CaEntity> {
        (**self).load_ca(id)
    }

    fn save_client(&self, entity: &Entity) -> StorageResult<()> {
        (**self).save_client(entity)
    }

    fn load_client(&self, id: &str) -> StorageResult<Entity> {
        (**self).load_client(id)
    }

    fn save_server(&self, entity: &Entity) -> StorageResult<()> {
        (**self).save_server(entity)
    }

    fn load_server(&self, id: &str) -> StorageResult<Entity> {
        (**self).load_server(id)
    }
}

/// Open a [`Storage`] backend from a `file://` or `leveldb://` URI.
pub fn open(uri: &str) -> StorageResult<Box<dyn Storage>> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(Box::new(file::FileStorage::new(path)?));
    }
    if let Some(path) = uri.strip_prefix("leveldb://") {
        return Ok(Box::new(leveldb::LevelDbStorage::open(path)?));
    }
    Err(super::error::StorageError::Backend(format!(
        "unrecognized storage URI {uri:?}; expected file:// or leveldb://"
    )))
}
