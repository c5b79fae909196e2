//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Entity Codec (C1) — PEM <-> parsed certificate+key round trip.
//!
//! Accepts RSA (PKCS#1, block type "RSA PRIVATE KEY") and ECDSA over
//! P-224/256/384/521 (SEC1, block type "EC PRIVATE KEY") private keys, and
//! emits the matching block type on encode.

use der::pem::LineEnding;
use ecdsa::SigningKey;
use p224::NistP224;
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::RsaPrivateKey;
use sec1::{DecodeEcPrivateKey, EncodeEcPrivateKey};
use x509_cert::der::{DecodePem, EncodePem};
use x509_cert::Certificate;

use super::error::{CodecError, CodecResult};

const RSA_LABEL: &str = "RSA PRIVATE KEY";
const EC_LABEL: &str = "EC PRIVATE KEY";

/// A private key in one of the five forms this service issues or accepts.
///
/// Carrying the curve as part of the variant (rather than a single
/// `Ecdsa(Box<dyn ...>)` trait object) keeps the codec's block-type branch
/// and the generator's `publicKey(priv)` branch exhaustive pattern matches,
/// per the redesign note in the design doc.
#[derive(Clone)]
pub enum PrivateKey {
    Rsa(Box<RsaPrivateKey>),
    EcdsaP224(Box<SigningKey<NistP224>>),
    EcdsaP256(Box<SigningKey<NistP256>>),
    EcdsaP384(Box<SigningKey<NistP384>>),
    EcdsaP521(Box<SigningKey<NistP521>>),
}

impl PrivateKey {
    fn pem_label(&self) -> &'static str {
        match self {
            PrivateKey::Rsa(_) => RSA_LABEL,
            PrivateKey::EcdsaP224(_)
            | PrivateKey::EcdsaP256(_)
            | PrivateKey::EcdsaP384(_)
            | PrivateKey::EcdsaP521(_) => EC_LABEL,
        }
    }
}

/// Parse a PEM-encoded certificate and a PEM-encoded private key into their
/// decoded forms.
///
/// Fails with [`CodecError::MalformedInput`] if either PEM doesn't carry the
/// expected block type or DER decoding fails, or [`CodecError::UnknownAlgorithm`]
/// if the key is neither RSA PKCS#1 nor SEC1 ECDSA over a supported curve.
pub fn parse(pem_cert: &str, pem_key: &str) -> CodecResult<(Certificate, PrivateKey)> {
    let cert = Certificate::from_pem(pem_cert.as_bytes())
        .map_err(|e| CodecError::MalformedInput(format!("certificate PEM: {e}")))?;
    let key = parse_key(pem_key)?;
    Ok((cert, key))
}

fn parse_key(pem_key: &str) -> CodecResult<PrivateKey> {
    if pem_key.contains(RSA_LABEL) {
        let key = RsaPrivateKey::from_pkcs1_pem(pem_key)
            .map_err(|e| CodecError::MalformedInput(format!("RSA key PEM: {e}")))?;
        return Ok(PrivateKey::Rsa(Box::new(key)));
    }

    if pem_key.contains(EC_LABEL) {
        // The SEC1 structure's OPTIONAL parameters field carries the named
        // curve OID. We don't decode it out-of-band; instead we try each
        // supported curve's concrete decoder in turn and accept the first
        // one whose length/OID checks pass, since a curve mismatch is
        // rejected by the decoder itself.
        if let Ok(key) = SigningKey::<NistP521>::from_sec1_pem(pem_key) {
            return Ok(PrivateKey::EcdsaP521(Box::new(key)));
        }
        if let Ok(key) = SigningKey::<NistP256>::from_sec1_pem(pem_key) {
            return Ok(PrivateKey::EcdsaP256(Box::new(key)));
        }
        if let Ok(key) = SigningKey::<NistP384>::from_sec1_pem(pem_key) {
            return Ok(PrivateKey::EcdsaP384(Box::new(key)));
        }
        if let Ok(key) = SigningKey::<NistP224>::from_sec1_pem(pem_key) {
            return Ok(PrivateKey::EcdsaP224(Box::new(key)));
        }
        return Err(CodecError::MalformedInput(
            "EC key PEM did not decode against any supported curve".into(),
        ));
    }

    Err(CodecError::UnknownAlgorithm)
}

/// Encode a certificate and private key pair back to PEM, choosing the
/// block type ("RSA PRIVATE KEY" or "EC PRIVATE KEY") from the key's
/// algorithm.
pub fn encode(cert: &Certificate, key: &PrivateKey) -> CodecResult<(String, String)> {
    let pem_cert = cert
        .to_pem(LineEnding::LF)
        .map_err(|e| CodecError::MalformedInput(format!("certificate re-encode: {e}")))?;

    let pem_key = match key {
        PrivateKey::Rsa(k) => k
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| CodecError::MalformedInput(format!("RSA key re-encode: {e}")))?
            .to_string(),
        PrivateKey::EcdsaP224(k) => k
            .to_sec1_pem(LineEnding::LF)
            .map_err(|e| CodecError::MalformedInput(format!("EC key re-encode: {e}")))?
            .to_string(),
        PrivateKey::EcdsaP256(k) => k
            .to_sec1_pem(LineEnding::LF)
            .map_err(|e| CodecError::MalformedInput(format!("EC key re-encode: {e}")))?
            .to_string(),
        PrivateKey::EcdsaP384(k) => k
            .to_sec1_pem(LineEnding::LF)
            .map_err(|e| CodecError::MalformedInput(format!("EC key re-encode: {e}")))?
            .to_string(),
        PrivateKey::EcdsaP521(k) => k
            .to_sec1_pem(LineEnding::LF)
            .map_err(|e| CodecError::MalformedInput(format!("EC key re-encode: {e}")))?
            .to_string(),
    };

    debug_assert!(pem_key.contains(key.pem_label()));
    Ok((pem_cert, pem_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ca::generator::{self, Curve, Options};

    #[test]
    fn rsa_round_trips_through_pem() {
        let opts = Options {
            name: "root".into(),
            rsa_bits: Some(2048),
            ..Options::default()
        };
        let entity = generator::generate(None, opts).expect("generate");
        let (cert, key) = parse(&entity.cert, &entity.key).expect("parse");
        let (pem_cert2, pem_key2) = encode(&cert, &key).expect("encode");
        let (cert2, _key2) = parse(&pem_cert2, &pem_key2).expect("re-parse");
        assert_eq!(cert.tbs_certificate, cert2.tbs_certificate);
    }

    #[test]
    fn ecdsa_p256_round_trips_through_pem() {
        let opts = Options {
            name: "root".into(),
            curve: Some(Curve::P256),
            ..Options::default()
        };
        let entity = generator::generate(None, opts).expect("generate");
        let (cert, key) = parse(&entity.cert, &entity.key).expect("parse");
        let (pem_cert2, pem_key2) = encode(&cert, &key).expect("encode");
        let (cert2, _) = parse(&pem_cert2, &pem_key2).expect("re-parse");
        assert_eq!(cert.tbs_certificate, cert2.tbs_certificate);
        assert!(matches!(key, PrivateKey::EcdsaP256(_)));
    }

    #[test]
    fn default_curve_is_p521() {
        let opts = Options {
            name: "root".into(),
            ..Options::default()
        };
        let entity = generator::generate(None, opts).expect("generate");
        let (_cert, key) = parse(&entity.cert, &entity.key).expect("parse");
        assert!(matches!(key, PrivateKey::EcdsaP521(_)));
    }

    #[test]
    fn malformed_cert_pem_is_rejected() {
        let err = parse("not a pem", "not a pem either").unwrap_err();
        assert!(matches!(err, CodecError::MalformedInput(_)));
    }
}
