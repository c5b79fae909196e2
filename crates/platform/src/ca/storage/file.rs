//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! `file://` storage backend — one YAML file per entity under `cas/`,
//! `clients/`, `servers/` subdirectories of the configured root.

use std::fs;
use std::path::{Path, PathBuf};

use pkid_types::{CaEntity, Entity};

use super::Storage;
use crate::ca::error::{StorageError, StorageResult};

pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        for sub in ["cas", "clients", "servers"] {
            fs::create_dir_all(root.join(sub))
                .map_err(|e| StorageError::Backend(format!("create {sub} dir: {e}")))?;
        }
        Ok(Self { root })
    }

    fn path_for(&self, sub: &str, id: &str) -> PathBuf {
        self.root.join(sub).join(format!("{id}.yaml"))
    }

    fn write<T: serde::Serialize>(&self, path: &Path, value: &T) -> StorageResult<()> {
        let yaml = serde_yaml::to_string(value)
            .map_err(|e| StorageError::Backend(format!("serialize: {e}")))?;
        fs::write(path, yaml).map_err(|e| StorageError::Backend(format!("write {path:?}: {e}")))
    }

    fn read<T: serde::de::DeserializeOwned>(&self, path: &Path, id: &str) -> StorageResult<T> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(id.to_string())
            } else {
                StorageError::Backend(format!("read {path:?}: {e}"))
            }
        })?;
        serde_yaml::from_str(&contents).map_err(|e| StorageError::Backend(format!("deserialize {path:?}: {e}")))
    }
}

impl Storage for FileStorage {
    fn save_ca(&self, ca: &CaEntity) -> StorageResult<()> {
        self.write(&self.path_for("cas", ca.id()), ca)
    }

    fn load_ca(&self, id: &str) -> StorageResult<CaEntity> {
        self.read(&self.path_for("cas", id), id)
    }

    fn save_client(&self, entity: &Entity) -> StorageResult<()> {
        self.write(&self.path_for("clients", &entity.id), entity)
    }

    fn load_client(&self, id: &str) -> StorageResult<Entity> {
        self.read(&self.path_for("clients", id), id)
    }

    fn save_server(&self, entity: &Entity) -> StorageResult<()> {
        self.write(&self.path_for("servers", &entity.id), entity)
    }

    fn load_server(&self, id: &str) -> StorageResult<Entity> {
        self.read(&self.path_for("servers", id), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_client_entity() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let entity = Entity::new("client-1", "leaf", "CERT".into(), "KEY".into());
        storage.save_client(&entity).unwrap();
        let loaded = storage.load_client("client-1").unwrap();
        assert_eq!(loaded, entity);
    }

    #[test]
    fn missing_entity_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let err = storage.load_ca("nope").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(id) if id == "nope"));
    }

    #[test]
    fn preserves_big_integer_fields_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let mut ca = CaEntity::new(Entity::new("ca-1", "root", "CERT".into(), "KEY".into()));
        ca.serial = num_bigint::BigUint::from(12345678901234567890u128);
        ca.revoked.push(num_bigint::BigUint::from(1u32));
        storage.save_ca(&ca).unwrap();
        let loaded = storage.load_ca("ca-1").unwrap();
        assert_eq!(loaded.serial, ca.serial);
        assert_eq!(loaded.revoked, ca.revoked);
    }
}
