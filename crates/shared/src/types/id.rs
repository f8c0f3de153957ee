//! Human-readable sequential entity ids.
//!
//! Records carry ids like `file_001`, `contract_001`, and `company_00001`.
//! The numeric part is allocated from a database counter; this module only
//! owns formatting and parsing.

use serde::{Deserialize, Serialize};

/// The kinds of records that receive sequential ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Uploaded file (`file_upd` table).
    File,
    /// Contract record.
    Contract,
    /// Company record.
    Company,
}

impl EntityKind {
    /// Counter key / id prefix for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Contract => "contract",
            Self::Company => "company",
        }
    }

    /// Zero-padding width of the numeric part.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::File | Self::Contract => 3,
            Self::Company => 5,
        }
    }

    /// Formats a sequence value as an id, e.g. `format_id(7)` -> `file_007`.
    ///
    /// Values wider than the padding keep all their digits.
    #[must_use]
    pub fn format_id(self, seq: i64) -> String {
        format!("{}_{:0width$}", self.prefix(), seq, width = self.width())
    }

    /// Parses the numeric part of an id of this kind.
    #[must_use]
    pub fn parse_id(self, id: &str) -> Option<i64> {
        let rest = id.strip_prefix(self.prefix())?.strip_prefix('_')?;
        rest.parse().ok()
    }
}
