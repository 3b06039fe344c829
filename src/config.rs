// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Registry configuration (SPEC_FULL §9.3).
//!
//! Built from explicit fields and validated once at construction time;
//! immutable afterward. Per spec §9's design note, batch size and key
//! templates are fields on this value, never globals.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::constants::AES_KEY_LEN;
use crate::errors::ConfigError;
use crate::name_mapper::NameMapper;

/// Common configuration shared by every ownership store variant.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Identity of this registry instance; a registry only mutates
    /// records whose mark says `owner = owner_id`.
    pub owner_id: String,
    /// Bidirectional endpoint-name/mark-name mapper.
    pub name_mapper: NameMapper,
    /// Normalized 32-byte AES-256 key, or `None` if encryption is
    /// disabled.
    pub aes_key: Option<Vec<u8>>,
    /// How long a store may serve its in-memory endpoint cache before
    /// re-fetching from the provider. Zero disables caching.
    pub cache_interval: Duration,
    /// When set, the sidecar-TXT store writes a second, legacy-form
    /// companion mark alongside the primary one for every create, so
    /// readers still on the older (non-type-embedding) name mapper keep
    /// seeing a mark they recognize (spec §4.4).
    pub legacy_compat: bool,
}

impl RegistryConfig {
    /// Construct and validate a [`RegistryConfig`].
    ///
    /// `aes_key` may be empty (no encryption), 32 raw bytes, or a
    /// base64 encoding of 32 bytes.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyOwnerId`] if `owner_id` is empty.
    /// - [`ConfigError::PrefixAndSuffixSet`] if both are non-empty.
    /// - [`ConfigError::InvalidAesKeyLength`] if `aes_key` is neither
    ///   empty, 32 raw bytes, nor base64 for 32 bytes.
    pub fn new(
        owner_id: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        wildcard_replacement: impl Into<String>,
        aes_key: &str,
        cache_interval: Duration,
        legacy_compat: bool,
    ) -> Result<Self, ConfigError> {
        let owner_id = owner_id.into();
        if owner_id.is_empty() {
            return Err(ConfigError::EmptyOwnerId);
        }

        let name_mapper = NameMapper::new(prefix, suffix, wildcard_replacement)?;
        let aes_key = normalize_aes_key(aes_key)?;

        Ok(Self {
            owner_id,
            name_mapper,
            aes_key,
            cache_interval,
            legacy_compat,
        })
    }

    /// The raw key bytes as an `Option<&[u8]>`, the shape the heritage
    /// codec expects.
    #[must_use]
    pub fn aes_key(&self) -> Option<&[u8]> {
        self.aes_key.as_deref()
    }
}

/// Normalize an AES key supplied as raw bytes or base64 text.
///
/// An empty string disables encryption. The caller-supplied key is never
/// logged.
///
/// # Errors
/// Returns [`ConfigError::InvalidAesKeyLength`] if the key is neither
/// empty, 32 raw bytes, nor a base64 encoding of 32 bytes.
pub fn normalize_aes_key(key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
    if key.is_empty() {
        return Ok(None);
    }
    if key.len() == AES_KEY_LEN {
        return Ok(Some(key.as_bytes().to_vec()));
    }
    match STANDARD.decode(key) {
        Ok(decoded) if decoded.len() == AES_KEY_LEN => Ok(Some(decoded)),
        Ok(decoded) => Err(ConfigError::InvalidAesKeyLength(decoded.len())),
        Err(_) => Err(ConfigError::InvalidAesKeyLength(key.len())),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
