//! # Blacklist signature-provider parsing
//!
//! Parses the `blacklist-signature-provider` option
//! (`PUBKEY=SCHEME:PAYLOAD`) and, for the one scheme this plugin supports,
//! decodes a WIF-style base58check-encoded secp256k1 private key into a
//! keypair the reconciler can later use to sign submissions.
//!
//! Parse failures never abort startup: a malformed separator is a
//! `ConfigError` the caller may choose to log and continue past, and an
//! unsupported or unrecognized scheme simply leaves the key unset.

use k256::ecdsa::SigningKey;
use sha2::{Digest, Sha256};
use shared_types::ConfigError;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum KeyDecodeError {
    #[error("base58 decode failed: {0}")]
    Base58(#[from] bs58::decode::Error),
    #[error("checksum mismatch in encoded private key")]
    BadChecksum,
    #[error("encoded private key has the wrong length")]
    BadLength,
    #[error("payload is not a valid secp256k1 scalar")]
    InvalidScalar,
}

/// A parsed secp256k1 keypair, held for later use signing blacklist
/// submissions. The private scalar is zeroized on drop.
pub struct KeyPair {
    private: Zeroizing<[u8; 32]>,
}

impl KeyPair {
    pub fn signing_key(&self) -> Result<SigningKey, KeyDecodeError> {
        SigningKey::from_slice(&*self.private).map_err(|_| KeyDecodeError::InvalidScalar)
    }
}

/// Decodes a WIF-style base58check private key: `[version byte][32-byte
/// scalar][4-byte checksum]`, where the checksum is the first four bytes of
/// `SHA256(SHA256(version || scalar))`.
fn decode_wif_private_key(payload: &str) -> Result<KeyPair, KeyDecodeError> {
    let raw = bs58::decode(payload).into_vec()?;
    if raw.len() != 1 + 32 + 4 {
        return Err(KeyDecodeError::BadLength);
    }
    let (body, checksum) = raw.split_at(raw.len() - 4);
    let digest = Sha256::digest(Sha256::digest(body));
    if &digest[..4] != checksum {
        return Err(KeyDecodeError::BadChecksum);
    }
    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(&body[1..]);
    // Validate it is actually a usable secp256k1 scalar before accepting it.
    SigningKey::from_slice(&scalar).map_err(|_| KeyDecodeError::InvalidScalar)?;
    Ok(KeyPair {
        private: Zeroizing::new(scalar),
    })
}

/// The outcome of parsing a signature-provider option: either a keypair was
/// installed (`KEY` scheme, valid payload) or nothing was (any other
/// outcome), each logged appropriately by the caller.
pub enum SignatureProviderOutcome {
    KeyInstalled(KeyPair),
    Rejected,
    Unrecognized,
}

/// Parses `PUBKEY=SCHEME:PAYLOAD`. Only the `=` before the first `:` counts
/// as the key/value separator; everything after the first `:` is payload
/// (so a base58 payload containing no `:` is unaffected, and the scheme
/// name itself may not contain `:`).
pub fn parse_signature_provider(option: &str) -> Result<SignatureProviderOutcome, ConfigError> {
    let eq_pos = option.find('=').ok_or_else(|| ConfigError::MissingEquals(option.to_string()))?;
    let (_pubkey, rest) = option.split_at(eq_pos);
    let rest = &rest[1..];
    let colon_pos = rest.find(':').ok_or_else(|| ConfigError::MissingColon(option.to_string()))?;
    let (scheme, payload) = rest.split_at(colon_pos);
    let payload = &payload[1..];

    match scheme {
        "KEY" => match decode_wif_private_key(payload) {
            Ok(keypair) => Ok(SignatureProviderOutcome::KeyInstalled(keypair)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode KEY-scheme private key, leaving signing key unset");
                Ok(SignatureProviderOutcome::Rejected)
            }
        },
        "KEOSD" => {
            tracing::warn!("blacklist-signature-provider scheme KEOSD is not supported, leaving signing key unset");
            Ok(SignatureProviderOutcome::Rejected)
        }
        other => {
            tracing::warn!(scheme = other, "unrecognized blacklist-signature-provider scheme, ignoring");
            Ok(SignatureProviderOutcome::Unrecognized)
        }
    }
}
