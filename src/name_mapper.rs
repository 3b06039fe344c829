// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Name mapper (spec §4.3): bidirectional mapping between an endpoint DNS
//! name and the DNS name of its companion ownership mark.

use crate::constants::RECORD_TYPE_TOKEN;
use crate::errors::ConfigError;

/// Record types the legacy (non-type-embedding) name form can disambiguate.
const SUPPORTED_LEGACY_TYPES: &[&str] = &["A", "AAAA", "CNAME", "NS"];

/// Bidirectional mapper between an endpoint's DNS name and its mark's DNS
/// name, constructed with a prefix or suffix (mutually exclusive) and an
/// optional wildcard replacement literal.
#[derive(Clone, Debug)]
pub struct NameMapper {
    prefix: String,
    suffix: String,
    wildcard_replacement: String,
}

impl NameMapper {
    /// Construct a mapper. `prefix` and `suffix` may not both be non-empty.
    ///
    /// # Errors
    /// Returns [`ConfigError::PrefixAndSuffixSet`] if both are set.
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        wildcard_replacement: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        if !prefix.is_empty() && !suffix.is_empty() {
            return Err(ConfigError::PrefixAndSuffixSet);
        }
        Ok(Self {
            prefix,
            suffix,
            wildcard_replacement: wildcard_replacement.into(),
        })
    }

    /// Returns the configured affix and whether it is a prefix (`true`) or
    /// a suffix (`false`), or `None` when both are empty.
    fn affix(&self) -> Option<(&str, bool)> {
        if !self.prefix.is_empty() {
            Some((self.prefix.as_str(), true))
        } else if !self.suffix.is_empty() {
            Some((self.suffix.as_str(), false))
        } else {
            None
        }
    }

    /// Replace a leading `*.` wildcard label per the configured
    /// replacement literal, if any.
    fn normalize_first(&self, first: &str) -> String {
        match (first.starts_with('*'), self.wildcard_replacement.is_empty()) {
            (true, false) => format!("{}{}", self.wildcard_replacement, &first[1..]),
            _ => first.to_string(),
        }
    }

    /// Map an endpoint DNS name to its companion mark's DNS name.
    #[must_use]
    pub fn to_mark_name(&self, dns_name: &str, record_type: &str) -> String {
        let (first, rest) = split_first_label(dns_name);
        let first = self.normalize_first(first);

        let combined = match self.affix() {
            Some((affix, is_prefix)) if affix.contains(RECORD_TYPE_TOKEN) => {
                let resolved = affix.replace(RECORD_TYPE_TOKEN, &record_type.to_lowercase());
                if is_prefix {
                    format!("{resolved}{first}")
                } else {
                    format!("{first}{resolved}")
                }
            }
            Some((affix, is_prefix)) => {
                let typed = format!("{}-{first}", record_type.to_lowercase());
                if is_prefix {
                    format!("{affix}{typed}")
                } else {
                    format!("{typed}{affix}")
                }
            }
            None => format!("{}-{first}", record_type.to_lowercase()),
        };

        if rest.is_empty() {
            combined
        } else {
            format!("{combined}.{rest}")
        }
    }

    /// Map an endpoint DNS name to the legacy (non-type-embedding)
    /// companion mark name: a static `<type>-` segment is used even when
    /// the configured affix embeds `%{record_type}` (spec §4.4
    /// legacy-compat mode). Used alongside [`Self::to_mark_name`] so
    /// readers still on the older name mapper keep seeing a mark they
    /// recognize.
    #[must_use]
    pub fn to_legacy_mark_name(&self, dns_name: &str, record_type: &str) -> String {
        let (first, rest) = split_first_label(dns_name);
        let first = self.normalize_first(first);
        let typed = format!("{}-{first}", record_type.to_lowercase());

        let combined = match self.affix() {
            // A token-embedding affix has no legacy equivalent position to
            // wrap around; fall back to the bare `<type>-<name>` form so the
            // affix's unresolved token literal never lands in a DNS name.
            Some((affix, _)) if affix.contains(RECORD_TYPE_TOKEN) => typed,
            Some((affix, true)) => format!("{affix}{typed}"),
            Some((affix, false)) => format!("{typed}{affix}"),
            None => typed,
        };

        if rest.is_empty() {
            combined
        } else {
            format!("{combined}.{rest}")
        }
    }

    /// Reverse [`Self::to_mark_name`]: recover the endpoint's DNS name and
    /// record type from a mark's DNS name. Returns empty strings if no
    /// supported pattern matches.
    #[must_use]
    pub fn to_endpoint_name(&self, mark_dns_name: &str) -> (String, String) {
        let (first, rest) = split_first_label(mark_dns_name);

        if let Some((affix, is_prefix)) = self.affix() {
            if affix.contains(RECORD_TYPE_TOKEN) {
                return Self::match_type_embedded(first, rest, affix, is_prefix);
            }
        }

        self.match_legacy(first, rest)
    }

    fn match_type_embedded(first: &str, rest: &str, affix: &str, is_prefix: bool) -> (String, String) {
        for ty in SUPPORTED_LEGACY_TYPES {
            let resolved = affix.replace(RECORD_TYPE_TOKEN, &ty.to_lowercase());
            let stripped = if is_prefix {
                first.strip_prefix(resolved.as_str())
            } else {
                first.strip_suffix(resolved.as_str())
            };
            if let Some(endpoint_first) = stripped {
                if !endpoint_first.is_empty() {
                    return (join(endpoint_first, rest), (*ty).to_string());
                }
            }
        }
        (String::new(), String::new())
    }

    fn match_legacy(&self, first: &str, rest: &str) -> (String, String) {
        let (static_affix, is_prefix) = self.affix().unwrap_or(("", true));
        let after_affix = if is_prefix {
            first.strip_prefix(static_affix)
        } else {
            first.strip_suffix(static_affix)
        };
        let Some(after_affix) = after_affix else {
            return (String::new(), String::new());
        };

        for ty in SUPPORTED_LEGACY_TYPES {
            let type_prefix = format!("{}-", ty.to_lowercase());
            if let Some(endpoint_first) = after_affix.strip_prefix(type_prefix.as_str()) {
                return (join(endpoint_first, rest), (*ty).to_string());
            }
        }
        (String::new(), String::new())
    }
}

fn split_first_label(name: &str) -> (&str, &str) {
    match name.split_once('.') {
        Some((first, rest)) => (first, rest),
        None => (name, ""),
    }
}

fn join(first: &str, rest: &str) -> String {
    if rest.is_empty() {
        first.to_string()
    } else {
        format!("{first}.{rest}")
    }
}

#[cfg(test)]
#[path = "name_mapper_tests.rs"]
mod name_mapper_tests;
