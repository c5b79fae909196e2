//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Error taxonomy for the CA domain engine.
//!
//! Each layer (codec, generator, storage, manager) owns a narrow error
//! enum; [`ManagerError`] is the one that reaches the HTTP boundary, where
//! it is mapped to a status code (§7 of the design doc: NotFound -> 404,
//! everything else -> 400).

use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed PEM input: {0}")]
    MalformedInput(String),
    #[error("unrecognized key algorithm")]
    UnknownAlgorithm,
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("unknown curve {0:?}")]
    UnknownCurve(String),
    #[error("key generation failed: {0}")]
    KeyGenFailure(String),
    #[error("certificate signing failed: {0}")]
    SignFailure(String),
    #[error("failed to parse parent CA key material: {0}")]
    ParentKeyParseFailure(#[from] CodecError),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("entity {0} not found")]
    NotFound(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

/// The error type returned from every public [`crate::ca::manager::BasicManager`]
/// and [`crate::ca::transactional::TransactionalManager`] operation.
///
/// This is deliberately a superset of the lower layers rather than a
/// wrapping enum per layer plus a top one: the HTTP handlers only ever
/// need to ask "is this NotFound or not", so a flat taxonomy keeps that
/// match trivial (see `crate::http::handlers::map_manager_error`).
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error("storage backend error: {0}")]
    BackendError(String),
    #[error("key generation failed: {0}")]
    KeyGenFailure(String),
    #[error("certificate signing failed: {0}")]
    SignFailure(String),
    #[error("invalid route: {0}")]
    InvalidRoute(String),
}

#[derive(Debug, Error)]
#[error("{0} not found")]
pub struct NotFoundError(pub String);

impl From<CodecError> for ManagerError {
    fn from(e: CodecError) -> Self {
        ManagerError::MalformedInput(e.to_string())
    }
}

impl From<GeneratorError> for ManagerError {
    fn from(e: GeneratorError) -> Self {
        match e {
            GeneratorError::UnknownCurve(c) => {
                ManagerError::MalformedInput(format!("unknown curve {c:?}"))
            }
            GeneratorError::KeyGenFailure(m) => ManagerError::KeyGenFailure(m),
            GeneratorError::SignFailure(m) => ManagerError::SignFailure(m),
            GeneratorError::ParentKeyParseFailure(e) => {
                ManagerError::MalformedInput(format!("parent key parse failure: {e}"))
            }
        }
    }
}

impl From<StorageError> for ManagerError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(id) => ManagerError::NotFound(NotFoundError(id)),
            StorageError::Backend(m) => ManagerError::BackendError(m),
        }
    }
}
