//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Certificate Generator (C2) — builds and self-signs or CA-signs an X.509
//! certificate given [`Options`].
//!
//! `sign_cert` is generic over the signer only (not the curve): the caller
//! always already holds a concrete, monomorphic signing key (its own fresh
//! key for a self-signed root, or the parent CA's decoded key for a
//! CA-signed child), so no curve-generic key generation needs to happen
//! inside this module's signing path.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use const_oid::db::rfc5280::{ID_KP_CLIENT_AUTH, ID_KP_SERVER_AUTH};
use const_oid::ObjectIdentifier;
use ecdsa::SigningKey;
use num_bigint::BigUint;
use p224::NistP224;
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use rsa::pkcs8::EncodePublicKey;
use rsa::RsaPrivateKey;
use signature::Signer;
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::der::referenced::OwnedToRef;
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, KeyUsages, SubjectKeyIdentifier,
};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{DynSignatureAlgorithmIdentifier, SignatureBitStringEncoding, SubjectPublicKeyInfoOwned};
use x509_cert::time::Validity;
use x509_cert::Certificate;

use super::codec::{self, PrivateKey};
use super::error::{GeneratorError, GeneratorResult};
use pkid_types::{CaEntity, Entity};

/// Extended-key-usage requested for an issued certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Usage {
    #[default]
    Any,
    ServerAuth,
    ClientAuth,
}

impl Usage {
    fn oid(self) -> ObjectIdentifier {
        match self {
            // RFC 5280's anyExtendedKeyUsage.
            Usage::Any => ObjectIdentifier::new_unwrap("2.5.29.37.0"),
            Usage::ServerAuth => ID_KP_SERVER_AUTH,
            Usage::ClientAuth => ID_KP_CLIENT_AUTH,
        }
    }
}

/// Named curve for an ECDSA key, as accepted in `Options.Curve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    P224,
    P256,
    P384,
    P521,
}

impl FromStr for Curve {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P-224" | "P224" => Ok(Curve::P224),
            "P-256" | "P256" => Ok(Curve::P256),
            "P-384" | "P384" => Ok(Curve::P384),
            "P-521" | "P521" => Ok(Curve::P521),
            other => Err(GeneratorError::UnknownCurve(other.to_string())),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Curve::P224 => "P-224",
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        };
        f.write_str(s)
    }
}

/// Options accepted by [`generate`]. Organization is hard-coded to "Acme Co".
#[derive(Debug, Clone)]
pub struct Options {
    pub name: String,
    pub not_before: Option<DateTime<Utc>>,
    pub valid_for: Duration,
    pub is_ca: bool,
    pub rsa_bits: Option<u32>,
    pub curve: Option<Curve>,
    pub usage: Usage,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            name: String::new(),
            not_before: None,
            valid_for: Duration::days(365),
            is_ca: false,
            rsa_bits: None,
            curve: None,
            usage: Usage::Any,
        }
    }
}

const ORGANIZATION: &str = "Acme Co";

/// Generate a fresh key pair and certificate.
///
/// When `parent` is `Some`, the certificate is signed by the parent CA's key
/// (the caller is responsible for incrementing the parent's serial counter
/// afterward, per the design doc's transactional ordering). When `parent` is
/// `None`, the certificate is self-signed and its serial is a fresh random
/// 128-bit integer.
pub fn generate(parent: Option<&CaEntity>, options: Options) -> GeneratorResult<Entity> {
    let not_before = options.not_before.unwrap_or_else(Utc::now);
    let not_after = not_before + options.valid_for;
    let validity = Validity {
        not_before: time_from(not_before)?,
        not_after: time_from(not_after)?,
    };
    let subject = name_for(&options.name)?;
    let eku = ExtendedKeyUsage(vec![options.usage.oid()]);

    // key-usage = keyEncipherment | digitalSignature, plus certSign iff IsCA;
    // basic-constraints CA:TRUE iff IsCA. Computed once here (rather than
    // left to `Profile::Root`/`SubCA`/`Leaf`'s own built-in extension sets)
    // so a self-signed non-CA entity gets CA:FALSE: `Profile::Root` forces
    // CA:TRUE unconditionally, which is wrong for a self-signed client or
    // server issued with no usable parent (the lenient-fallback path in
    // `BasicManager::create_entity`).
    let mut key_usage_bits = KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment;
    if options.is_ca {
        key_usage_bits |= KeyUsages::KeyCertSign;
    }
    let key_usage = KeyUsage(key_usage_bits);
    let basic_constraints = BasicConstraints {
        ca: options.is_ca,
        path_len_constraint: None,
    };

    let (child_key, child_spki) = fresh_key(&options)?;
    let ski = SubjectKeyIdentifier::try_from(child_spki.owned_to_ref())
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;

    let certificate = match parent {
        None => {
            let profile = Profile::Manual { issuer: None };
            sign_with(
                &child_key,
                profile,
                random_serial()?,
                subject,
                validity,
                child_spki,
                &eku,
                &key_usage,
                &basic_constraints,
                None,
                Some(&ski),
            )?
        }
        Some(ca) => {
            let (parent_cert, parent_key) = codec::parse(&ca.entity.cert, &ca.entity.key)?;
            let issuer = parent_cert.tbs_certificate.subject.clone();
            let parent_spki = parent_cert.tbs_certificate.subject_public_key_info.clone();
            let aki = AuthorityKeyIdentifier::try_from(parent_spki.owned_to_ref())
                .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
            let profile = Profile::Manual { issuer: Some(issuer) };
            let serial = serial_number_from(&ca.serial)?;
            sign_with(
                &parent_key,
                profile,
                serial,
                subject,
                validity,
                child_spki,
                &eku,
                &key_usage,
                &basic_constraints,
                Some(&aki),
                Some(&ski),
            )?
        }
    };

    let (pem_cert, pem_key) = codec::encode(&certificate, &child_key)?;
    Ok(Entity::new(String::new(), options.name, pem_cert, pem_key))
}

/// Generate a fresh key pair (RSA or ECDSA, per `options`) and its SPKI.
fn fresh_key(options: &Options) -> GeneratorResult<(PrivateKey, SubjectPublicKeyInfoOwned)> {
    if let Some(bits) = options.rsa_bits {
        let key = RsaPrivateKey::new(&mut rand::rngs::OsRng, bits as usize)
            .map_err(|e| GeneratorError::KeyGenFailure(e.to_string()))?;
        let spki = rsa_spki(&key)?;
        return Ok((PrivateKey::Rsa(Box::new(key)), spki));
    }

    match options.curve.unwrap_or(Curve::P521) {
        Curve::P224 => {
            let key = SigningKey::<NistP224>::random(&mut rand::rngs::OsRng);
            let spki = ecdsa_spki(&key)?;
            Ok((PrivateKey::EcdsaP224(Box::new(key)), spki))
        }
        Curve::P256 => {
            let key = SigningKey::<NistP256>::random(&mut rand::rngs::OsRng);
            let spki = ecdsa_spki(&key)?;
            Ok((PrivateKey::EcdsaP256(Box::new(key)), spki))
        }
        Curve::P384 => {
            let key = SigningKey::<NistP384>::random(&mut rand::rngs::OsRng);
            let spki = ecdsa_spki(&key)?;
            Ok((PrivateKey::EcdsaP384(Box::new(key)), spki))
        }
        Curve::P521 => {
            let key = SigningKey::<NistP521>::random(&mut rand::rngs::OsRng);
            let spki = ecdsa_spki(&key)?;
            Ok((PrivateKey::EcdsaP521(Box::new(key)), spki))
        }
    }
}

/// Build and sign a certificate template with `signer_key` as the issuer's
/// (or self's, for a root) signing key. Dispatches once on the signer's key
/// kind to pick the concrete `Signer`/`Signature` pair the builder needs.
#[allow(clippy::too_many_arguments)]
fn sign_with(
    signer_key: &PrivateKey,
    profile: Profile,
    serial: SerialNumber,
    subject: Name,
    validity: Validity,
    spki: SubjectPublicKeyInfoOwned,
    eku: &ExtendedKeyUsage,
    key_usage: &KeyUsage,
    basic_constraints: &BasicConstraints,
    aki: Option<&AuthorityKeyIdentifier>,
    ski: Option<&SubjectKeyIdentifier>,
) -> GeneratorResult<Certificate> {
    match signer_key {
        PrivateKey::Rsa(key) => {
            let signer = rsa::pkcs1v15::SigningKey::<sha2::Sha256>::new((**key).clone());
            build_and_sign::<_, rsa::pkcs1v15::Signature>(
                profile, serial, subject, validity, spki, &signer, eku, key_usage, basic_constraints, aki, ski,
            )
        }
        PrivateKey::EcdsaP224(key) => build_and_sign::<_, ecdsa::Signature<NistP224>>(
            profile,
            serial,
            subject,
            validity,
            spki,
            key.as_ref(),
            eku,
            key_usage,
            basic_constraints,
            aki,
            ski,
        ),
        PrivateKey::EcdsaP256(key) => build_and_sign::<_, ecdsa::Signature<NistP256>>(
            profile,
            serial,
            subject,
            validity,
            spki,
            key.as_ref(),
            eku,
            key_usage,
            basic_constraints,
            aki,
            ski,
        ),
        PrivateKey::EcdsaP384(key) => build_and_sign::<_, ecdsa::Signature<NistP384>>(
            profile,
            serial,
            subject,
            validity,
            spki,
            key.as_ref(),
            eku,
            key_usage,
            basic_constraints,
            aki,
            ski,
        ),
        PrivateKey::EcdsaP521(key) => build_and_sign::<_, ecdsa::Signature<NistP521>>(
            profile,
            serial,
            subject,
            validity,
            spki,
            key.as_ref(),
            eku,
            key_usage,
            basic_constraints,
            aki,
            ski,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_and_sign<S, Sig>(
    profile: Profile,
    serial: SerialNumber,
    subject: Name,
    validity: Validity,
    spki: SubjectPublicKeyInfoOwned,
    signer: &S,
    eku: &ExtendedKeyUsage,
    key_usage: &KeyUsage,
    basic_constraints: &BasicConstraints,
    aki: Option<&AuthorityKeyIdentifier>,
    ski: Option<&SubjectKeyIdentifier>,
) -> GeneratorResult<Certificate>
where
    S: Signer<Sig> + DynSignatureAlgorithmIdentifier,
    Sig: SignatureBitStringEncoding,
{
    let mut builder = CertificateBuilder::new(profile, serial, validity, subject, spki, signer)
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    builder
        .add_extension(basic_constraints)
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    builder
        .add_extension(key_usage)
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    builder
        .add_extension(eku)
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    if let Some(aki) = aki {
        builder
            .add_extension(aki)
            .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    }
    if let Some(ski) = ski {
        builder
            .add_extension(ski)
            .map_err(|e| GeneratorError::SignFailure(e.to_string()))?;
    }
    builder
        .build::<Sig>()
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))
}

fn name_for(common_name: &str) -> GeneratorResult<Name> {
    format!("O={ORGANIZATION},CN={common_name}")
        .parse()
        .map_err(|e: x509_cert::der::Error| GeneratorError::SignFailure(e.to_string()))
}

fn time_from(dt: DateTime<Utc>) -> GeneratorResult<x509_cert::time::Time> {
    x509_cert::time::Time::try_from(std::time::SystemTime::from(dt))
        .map_err(|e| GeneratorError::SignFailure(e.to_string()))
}

fn random_serial() -> GeneratorResult<SerialNumber> {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    SerialNumber::new(&bytes).map_err(|e| GeneratorError::SignFailure(e.to_string()))
}

fn serial_number_from(value: &BigUint) -> GeneratorResult<SerialNumber> {
    let mut bytes = value.to_bytes_be();
    if bytes.is_empty() {
        bytes.push(0);
    }
    SerialNumber::new(&bytes).map_err(|e| GeneratorError::SignFailure(e.to_string()))
}

fn rsa_spki(key: &RsaPrivateKey) -> GeneratorResult<SubjectPublicKeyInfoOwned> {
    let der = key
        .to_public_key()
        .to_public_key_der()
        .map_err(|e| GeneratorError::KeyGenFailure(e.to_string()))?;
    SubjectPublicKeyInfoOwned::try_from(der.as_bytes())
        .map_err(|e| GeneratorError::KeyGenFailure(e.to_string()))
}

fn ecdsa_spki<C>(key: &SigningKey<C>) -> GeneratorResult<SubjectPublicKeyInfoOwned>
where
    C: elliptic_curve::PrimeCurve + ecdsa::EcdsaCurve + elliptic_curve::CurveArithmetic,
    <C as elliptic_curve::CurveArithmetic>::AffinePoint: elliptic_curve::sec1::ToEncodedPoint<C>,
    elliptic_curve::PublicKey<C>: EncodePublicKey,
{
    let der = key
        .verifying_key()
        .to_public_key_der()
        .map_err(|e| GeneratorError::KeyGenFailure(e.to_string()))?;
    SubjectPublicKeyInfoOwned::try_from(der.as_bytes())
        .map_err(|e| GeneratorError::KeyGenFailure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_signed_root_is_ca_true() {
        let opts = Options {
            name: "root".into(),
            rsa_bits: Some(2048),
            is_ca: true,
            ..Options::default()
        };
        let entity = generate(None, opts).expect("generate");
        assert!(!entity.cert.is_empty());
        assert!(entity.key.contains("RSA PRIVATE KEY"));
    }

    #[test]
    fn sub_ca_is_signed_by_parent() {
        let root_opts = Options {
            name: "root".into(),
            curve: Some(Curve::P256),
            is_ca: true,
            ..Options::default()
        };
        let root = generate(None, root_opts).expect("generate root");
        let root_ca = CaEntity::new(pkid_types::Entity::new("root-id", "root", root.cert, root.key));

        let sub_opts = Options {
            name: "sub".into(),
            curve: Some(Curve::P256),
            is_ca: true,
            ..Options::default()
        };
        let sub = generate(Some(&root_ca), sub_opts).expect("generate sub");
        assert!(!sub.cert.is_empty());
    }

    #[test]
    fn unknown_curve_is_rejected() {
        assert!("bogus".parse::<Curve>().is_err());
    }

    /// A self-signed entity issued with `is_ca: false` (the lenient-fallback
    /// path for a client/server whose parent failed to load) must still get
    /// CA:FALSE, not the CA:TRUE a root always carries.
    #[test]
    fn self_signed_non_ca_gets_basic_constraints_false() {
        let opts = Options {
            name: "leaf".into(),
            curve: Some(Curve::P256),
            usage: Usage::ClientAuth,
            is_ca: false,
            ..Options::default()
        };
        let entity = generate(None, opts).expect("generate");
        let (cert, _key) = codec::parse(&entity.cert, &entity.key).expect("parse");
        let bc = basic_constraints_of(&cert).expect("basic constraints extension present");
        assert!(!bc.ca);
    }

    #[test]
    fn self_signed_ca_gets_basic_constraints_true() {
        let opts = Options {
            name: "root".into(),
            curve: Some(Curve::P256),
            is_ca: true,
            ..Options::default()
        };
        let entity = generate(None, opts).expect("generate");
        let (cert, _key) = codec::parse(&entity.cert, &entity.key).expect("parse");
        let bc = basic_constraints_of(&cert).expect("basic constraints extension present");
        assert!(bc.ca);
    }

    fn basic_constraints_of(cert: &Certificate) -> Option<BasicConstraints> {
        use x509_cert::der::Decode;
        let oid = const_oid::ObjectIdentifier::new_unwrap("2.5.29.19");
        let extensions = cert.tbs_certificate.extensions.as_ref()?;
        let ext = extensions.iter().find(|e| e.extn_id == oid)?;
        BasicConstraints::from_der(ext.extn_value.as_bytes()).ok()
    }
}
