// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Heritage codec (spec §4.2, wire format in spec §6).
//!
//! Serializes/deserializes a label bag to and from a single TXT-compatible
//! string carrying the fixed heritage token `external-dns`:
//!
//! ```text
//! "heritage=external-dns,external-dns/owner=<id>[,external-dns/<k>=<v>]*"
//! ```
//!
//! When an AES-256 key is configured, the inner body (the part between the
//! outer quotes) is replaced with `base64(AES-256-GCM(body))`; decryption
//! failure falls back to plaintext parsing so that a key rotation can roll
//! through a mixed fleet of old and new marks.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ring::aead::{self, BoundKey, Nonce, NonceSequence, OpeningKey, SealingKey, UnboundKey};
use ring::error::Unspecified;
use ring::rand::{SecureRandom, SystemRandom};

use crate::constants::HERITAGE_TOKEN;
use crate::endpoint::Labels;
use crate::errors::HeritageError;

const NONCE_LEN: usize = 12;

struct FixedNonce([u8; NONCE_LEN]);

impl NonceSequence for FixedNonce {
    fn advance(&mut self) -> Result<Nonce, Unspecified> {
        Ok(Nonce::assume_unique_for_key(self.0))
    }
}

fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, HeritageError> {
    let unbound = UnboundKey::new(&aead::AES_256_GCM, key).map_err(|_| HeritageError::Decrypt)?;
    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes).map_err(|_| HeritageError::Decrypt)?;
    let mut sealing = SealingKey::new(unbound, FixedNonce(nonce_bytes));

    let mut in_out = plaintext.to_vec();
    sealing
        .seal_in_place_append_tag(aead::Aad::empty(), &mut in_out)
        .map_err(|_| HeritageError::Decrypt)?;

    let mut out = Vec::with_capacity(NONCE_LEN + in_out.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&in_out);
    Ok(out)
}

fn decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, HeritageError> {
    if ciphertext.len() < NONCE_LEN {
        return Err(HeritageError::Decrypt);
    }
    let (nonce_bytes, body) = ciphertext.split_at(NONCE_LEN);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);

    let unbound = UnboundKey::new(&aead::AES_256_GCM, key).map_err(|_| HeritageError::Decrypt)?;
    let mut opening = OpeningKey::new(unbound, FixedNonce(nonce));

    let mut in_out = body.to_vec();
    let plaintext = opening
        .open_in_place(aead::Aad::empty(), &mut in_out)
        .map_err(|_| HeritageError::Decrypt)?;
    Ok(plaintext.to_vec())
}

/// Serialize a label bag to a heritage string.
///
/// Keys are sorted lexicographically for determinism. When `aes_key` is
/// `Some`, the inner body is encrypted and base64-wrapped before quoting.
#[must_use]
pub fn serialize(labels: &Labels, quoted: bool, aes_key: Option<&[u8]>) -> String {
    let mut parts = vec![format!("heritage={HERITAGE_TOKEN}")];
    let mut keys: Vec<&String> = labels.keys().collect();
    keys.sort();
    for k in keys {
        parts.push(format!("{HERITAGE_TOKEN}/{k}={}", labels[k]));
    }
    let body = parts.join(",");

    let wire_body = match aes_key {
        Some(key) => match encrypt(key, body.as_bytes()) {
            Ok(ciphertext) => STANDARD.encode(ciphertext),
            // Construction-time validation guarantees a 32-byte key; a
            // failure here would only happen under `ring` internal error,
            // which we do not expect to hit in practice.
            Err(_) => body,
        },
        None => body,
    };

    if quoted {
        format!("\"{wire_body}\"")
    } else {
        wire_body
    }
}

/// Deserialize a heritage string into its label bag.
///
/// # Errors
/// Returns [`HeritageError::InvalidHeritage`] when no canonical
/// `heritage=external-dns` occurs exactly once.
pub fn deserialize(s: &str, aes_key: Option<&[u8]>) -> Result<Labels, HeritageError> {
    let stripped = s.trim().trim_matches('"');

    let body = match aes_key {
        Some(key) => match STANDARD
            .decode(stripped)
            .ok()
            .and_then(|ct| decrypt(key, &ct).ok())
            .and_then(|plain| String::from_utf8(plain).ok())
        {
            Some(plain) => plain,
            None => stripped.to_string(),
        },
        None => stripped.to_string(),
    };

    parse_body(&body)
}

fn parse_body(body: &str) -> Result<Labels, HeritageError> {
    let prefix = format!("{HERITAGE_TOKEN}/");
    let mut labels = Labels::new();
    let mut heritage_count = 0usize;

    for token in body.split(',') {
        let Some((k, v)) = token.split_once('=') else {
            continue;
        };
        if k == "heritage" {
            heritage_count += 1;
            if v != HERITAGE_TOKEN {
                return Err(HeritageError::InvalidHeritage(format!(
                    "heritage token carries unexpected value {v:?}"
                )));
            }
        } else if let Some(label_key) = k.strip_prefix(&prefix) {
            labels.insert(label_key.to_string(), v.to_string());
        }
        // Anything else (lacking '=', or an unrecognized prefix) is
        // tolerated gibberish and ignored.
    }

    if heritage_count != 1 {
        return Err(HeritageError::InvalidHeritage(format!(
            "expected exactly one heritage={HERITAGE_TOKEN} occurrence, found {heritage_count}"
        )));
    }

    Ok(labels)
}

#[cfg(test)]
#[path = "heritage_tests.rs"]
mod heritage_tests;
