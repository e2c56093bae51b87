//! Trusted identities for auto-op.
//!
//! An identity is the `ident@host` pair a user connects with. Matching is
//! case-insensitive and ignores the `~` that servers prepend to idents they
//! could not verify, so `~Alice@Host.Example` and `alice@host.example` are the
//! same person.

use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

/// Canonical form of an identity: `IDENT@HOST`, upper-cased, without the
/// leading `~` on the ident.
pub fn normalize(ident: &str, host: &str) -> String {
    format!(
        "{}@{}",
        ident.trim().trim_start_matches('~'),
        host.trim()
    )
    .to_uppercase()
}

/// Why a `[autoop]` entry was skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrustEntryError {
    #[error("autoop entry '{key}' is not a string")]
    NotAString { key: String },
    #[error("autoop entry '{key}' is empty")]
    Empty { key: String },
}

/// Parse one `[autoop]` value into its normalized form.
///
/// Only the part after the last `~` is kept, so both `~alice@host` and
/// `alice@host` produce `ALICE@HOST`.
pub fn parse_entry(key: &str, value: &toml::Value) -> Result<String, TrustEntryError> {
    let raw = value.as_str().ok_or_else(|| TrustEntryError::NotAString {
        key: key.to_string(),
    })?;
    let mask = raw.rsplit('~').next().unwrap_or(raw).trim();
    if mask.is_empty() {
        return Err(TrustEntryError::Empty {
            key: key.to_string(),
        });
    }
    Ok(mask.to_uppercase())
}

/// Set of normalized identities that get auto-op.
///
/// Never mutated after construction; a reload builds a new set and swaps it
/// in whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedIdentitySet {
    entries: HashSet<String>,
}

impl TrustedIdentitySet {
    /// Build from the `[autoop]` table. Bad entries are logged and skipped.
    pub fn rebuild(table: &toml::Table) -> Self {
        let mut entries = HashSet::with_capacity(table.len());
        for (key, value) in table {
            match parse_entry(key, value) {
                Ok(entry) => {
                    entries.insert(entry);
                }
                Err(e) => warn!(error = %e, "Skipping autoop entry"),
            }
        }
        Self { entries }
    }

    pub fn is_trusted(&self, ident: &str, host: &str) -> bool {
        !host.is_empty() && self.entries.contains(&normalize(ident, host))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in sorted order, for display.
    pub fn sorted(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.entries.iter().map(String::as_str).collect();
        entries.sort_unstable();
        entries
    }
}
