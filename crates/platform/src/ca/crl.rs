//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! CRL (Certificate Revocation List) generation for `GetCRL` (C4).
//!
//! No builder type for CRLs ships in the `x509-cert` crate the way one does
//! for certificates, so this hand-rolls the `TBSCertList`/`CertificateList`
//! structures from RFC 5280 directly and signs them with the same signer
//! dispatch the generator uses for certificates.

use chrono::{Duration, Utc};
use ecdsa::SigningKey;
use num_bigint::BigUint;
use p224::NistP224;
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use signature::Signer;
use x509_cert::crl::{CertificateList, RevokedCert, TbsCertList};
use x509_cert::der::asn1::BitString;
use x509_cert::der::pem::LineEnding;
use x509_cert::der::{Encode, EncodePem};
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{DynSignatureAlgorithmIdentifier, SignatureBitStringEncoding};
use x509_cert::time::Time;
use x509_cert::Certificate;

use super::codec::PrivateKey;
use super::error::{GeneratorError, GeneratorResult};

/// Build and sign a CRL for `issuer_cert`/`issuer_key`, listing `revoked` in
/// order with `RevocationTime = now`.
pub fn build(issuer_cert: &Certificate, issuer_key: &PrivateKey, revoked: &[BigUint]) -> GeneratorResult<String> {
    let now = Utc::now();
    let this_update = time_from(now)?;
    let next_update = time_from(now + Duration::days(365))?;

    let revoked_certificates = if revoked.is_empty() {
        None
    } else {
        let mut entries = Vec::with_capacity(revoked.len());
        for serial in revoked {
            let mut bytes = serial.to_bytes_be();
            if bytes.is_empty() {
                bytes.push(0);
            }
            entries.push(RevokedCert {
                serial_number: SerialNumber::new(&bytes)
                    .map_err(|e| GeneratorError::SignFailure(e.to_string()))?,
                revocation_date: this_update,
                crl_entry_extensions: None,
            });
        }
        Some(entries)
    };

    let tbs = TbsCertList {
        version: x509_cert::Version::V2,
        signature: issuer_cert.signature_algorithm.clone(),
        issuer: issuer_cert.tbs_certificate.subject.clone(),
        this_update,
        next_update: Some(next_update),
        revoked_certificates,
        crl_extensions: None,
    };

    let crl = sign_tbs(tbs, issuer_key)?;
    crl.to_pem(LineEnding::LF)
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))
}

fn time_from(dt: chrono::DateTime<Utc>) -> GeneratorResult<Time> {
    Time::try_from(std::time::SystemTime::from(dt)).map_err(|e| GeneratorError::SignFailure(e.to_string()))
}

fn sign_tbs(tbs: TbsCertList, key: &PrivateKey) -> GeneratorResult<CertificateList> {
    match key {
        PrivateKey::Rsa(k) => {
            let signer = rsa::pkcs1v15::SigningKey::<sha2::Sha256>::new((**k).clone());
            finish_signature::<_, rsa::pkcs1v15::Signature>(tbs, &signer)
        }
        PrivateKey::EcdsaP224(k) => finish_signature::<_, ecdsa::Signature<NistP224>>(tbs, k.as_ref()),
        PrivateKey::EcdsaP256(k) => finish_signature::<_, ecdsa::Signature<NistP256>>(tbs, k.as_ref()),
        PrivateKey::EcdsaP384(k) => finish_signature::<_, ecdsa::Signature<NistP384>>(tbs, k.as_ref()),
        PrivateKey::EcdsaP521(k) => finish_signature::<_, ecdsa::Signature<NistP521>>(tbs, k.as_ref()),
    }
}

fn finish_signature<S, Sig>(tbs: TbsCertList, signer: &S) -> GeneratorResult<CertificateList>
where
    S: Signer<Sig> + DynSignatureAlgorithmIdentifier,
    Sig: SignatureBitStringEncoding,
{
    let signature_algorithm = signer
        .signature_algorithm_identifier()
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    let tbs_der = tbs.to_der().map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    let signature: Sig = signer.try_sign(&tbs_der).map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    let signature: BitString = signature
        .to_bitstring()
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    Ok(CertificateList {
        tbs_cert_list: tbs,
        signature_algorithm,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ca::{codec, generator};
    use x509_cert::der::DecodePem;

    #[test]
    fn empty_crl_still_signs() {
        let entity = generator::generate(
            None,
            generator::Options {
                name: "root".into(),
                curve: Some(generator::Curve::P256),
                is_ca: true,
                ..generator::Options::default()
            },
        )
        .expect("generate");
        let (cert, key) = codec::parse(&entity.cert, &entity.key).expect("parse");
        let pem = build(&cert, &key, &[]).expect("build crl");
        assert!(pem.contains("BEGIN X509 CRL"));
    }

    #[test]
    fn crl_contains_one_entry_per_revoked_serial() {
        let entity = generator::generate(
            None,
            generator::Options {
                name: "root".into(),
                curve: Some(generator::Curve::P256),
                is_ca: true,
                ..generator::Options::default()
            },
        )
        .expect("generate");
        let (cert, key) = codec::parse(&entity.cert, &entity.key).expect("parse");
        let revoked = vec![BigUint::from(1u32), BigUint::from(2u32), BigUint::from(3u32)];
        let pem = build(&cert, &key, &revoked).expect("build crl");
        let parsed = CertificateList::from_pem(pem.as_bytes()).expect("parse crl back");
        assert_eq!(
            parsed.tbs_cert_list.revoked_certificates.map(|v| v.len()),
            Some(3)
        );
    }
}
