//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Shared entity and record types for the pkid certificate authority service.
//!
//! These are the wire/storage types that flow between the persistence port,
//! the manager layers, and the HTTP surface. They carry no behavior of their
//! own beyond (de)serialization and small accessors — the business rules that
//! act on them live in `pkid_platform::ca`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// A certificate + private key pair plus the metadata the manager tracks for it.
///
/// Shared by all three roles (CA, client, server); a bare `Entity` is used for
/// clients and servers, while CAs wrap one in [`CaEntity`] with the extra
/// bookkeeping fields a CA needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// PEM-encoded X.509 certificate ("CERTIFICATE" block).
    pub cert: String,
    /// PEM-encoded private key ("RSA PRIVATE KEY" or "EC PRIVATE KEY" block).
    pub key: String,
    pub is_revoked: bool,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cert: String, key: String) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cert,
            key,
            is_revoked: false,
        }
    }
}

/// A Certificate Authority: an [`Entity`] extended with the issuance counter,
/// revocation list, and the three child maps it directly issued into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaEntity {
    #[serde(flatten)]
    pub entity: Entity,
    /// Next serial number this CA will assign to a direct child. Starts at 1.
    pub serial: BigUint,
    /// Serial numbers this CA has revoked, in revocation order.
    pub revoked: Vec<BigUint>,
    pub cas: BTreeMap<String, String>,
    pub clients: BTreeMap<String, String>,
    pub servers: BTreeMap<String, String>,
}

impl CaEntity {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            serial: BigUint::from(1u32),
            revoked: Vec::new(),
            cas: BTreeMap::new(),
            clients: BTreeMap::new(),
            servers: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.entity.id
    }

    /// Child-ID -> child-name map for the given role.
    pub fn children(&self, role: Role) -> &BTreeMap<String, String> {
        match role {
            Role::Ca => &self.cas,
            Role::Client => &self.clients,
            Role::Server => &self.servers,
        }
    }

    pub fn children_mut(&mut self, role: Role) -> &mut BTreeMap<String, String> {
        match role {
            Role::Ca => &mut self.cas,
            Role::Client => &mut self.clients,
            Role::Server => &mut self.servers,
        }
    }

    /// A view of this CA suitable for the `GET /ca/{ca}` endpoint: `Cert` and
    /// `Key` are elided (present but empty), everything else is unchanged.
    pub fn elided(&self) -> CaEntity {
        let mut view = self.clone();
        view.entity.cert.clear();
        view.entity.key.clear();
        view
    }
}

/// The three kinds of entity the service manages. Every hierarchy operation
/// is parameterized by one of these rather than duplicated per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Ca,
    Client,
    Server,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Ca => "ca",
            Role::Client => "client",
            Role::Server => "server",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path or form field named a role that isn't one of `ca`/`client`/`server`.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized entity role {0:?}, expected one of ca, client, server")]
pub struct InvalidRole(pub String);

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ca" => Ok(Role::Ca),
            "client" => Ok(Role::Client),
            "server" => Ok(Role::Server),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}
