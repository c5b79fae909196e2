//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! `leveldb://` storage backend — an embedded ordered key-value store, keys
//! of the form `{role}::{id}`.

use std::sync::Mutex;

use pkid_types::{CaEntity, Entity};
use rusty_leveldb::{Options, DB};

use super::Storage;
use crate::ca::error::{StorageError, StorageResult};

pub struct LevelDbStorage {
    db: Mutex<DB>,
}

impl LevelDbStorage {
    pub fn open(path: &str) -> StorageResult<Self> {
        let db = DB::open(path, Options::default())
            .map_err(|e| StorageError::Backend(format!("open leveldb at {path:?}: {e}")))?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let mut db = self.db.lock().expect("leveldb mutex poisoned");
        Ok(db.get(key.as_bytes()))
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let mut db = self.db.lock().expect("leveldb mutex poisoned");
        db.put(key.as_bytes(), value)
            .map_err(|e| StorageError::Backend(format!("put {key:?}: {e}")))?;
        db.flush()
            .map_err(|e| StorageError::Backend(format!("flush after put {key:?}: {e}")))
    }

    fn save<T: serde::Serialize>(&self, role: &str, id: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_vec(value).map_err(|e| StorageError::Backend(format!("serialize: {e}")))?;
        self.put(&format!("{role}::{id}"), &json)
    }

    fn load<T: serde::de::DeserializeOwned>(&self, role: &str, id: &str) -> StorageResult<T> {
        let bytes = self
            .get(&format!("{role}::{id}"))?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Backend(format!("deserialize {id}: {e}")))
    }
}

impl Storage for LevelDbStorage {
    fn save_ca(&self, ca: &CaEntity) -> StorageResult<()> {
        self.save("ca", ca.id(), ca)
    }

    fn load_ca(&self, id: &str) -> StorageResult<CaEntity> {
        self.load("ca", id)
    }

    fn save_client(&self, entity: &Entity) -> StorageResult<()> {
        self.save("client", &entity.id, entity)
    }

    fn load_client(&self, id: &str) -> StorageResult<Entity> {
        self.load("client", id)
    }

    fn save_server(&self, entity: &Entity) -> StorageResult<()> {
        self.save("server", &entity.id, entity)
    }

    fn load_server(&self, id: &str) -> StorageResult<Entity> {
        self.load("server", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_server_entity() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LevelDbStorage::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let entity = Entity::new("server-1", "edge", "CERT".into(), "KEY".into());
        storage.save_server(&entity).unwrap();
        let loaded = storage.load_server("server-1").unwrap();
        assert_eq!(loaded, entity);
    }

    #[test]
    fn missing_entity_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LevelDbStorage::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let err = storage.load_client("nope").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(id) if id == "nope"));
    }
}
