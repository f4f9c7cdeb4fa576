//! Recoverable problems found while decoding and materializing.
//!
//! None of these abort a load. The offending element or field is skipped and
//! a diagnostic is kept so the caller can report a partial result.

use serde::Serialize;
use tracing::warn;

use crate::refs::{KeyId, RefId, RefKind};

/// A single recoverable problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Diagnostic {
    /// A numeric attribute failed to parse; the element was skipped.
    InvalidNumber {
        element: String,
        attribute: String,
        value: String,
    },
    /// A required attribute was absent; the element was skipped.
    MissingAttribute { element: String, attribute: String },
    /// A reference id points at nothing.
    DanglingReference { kind: RefKind, id: RefId },
    /// A table key whose name string was never declared.
    UnresolvedKey { key: KeyId },
    /// A `value` appeared inside a string or vector ref.
    ValueOutsideContainer { kind: RefKind },
    /// A table `value` with no preceding `key`.
    ValueWithoutKey { table: RefId },
    /// An event log entry without a usable timestamp; the entry was skipped.
    MissingTimestamp { table: RefId },
    /// An event log entry lacks a field every event should carry; the field is left empty.
    MissingField { table: RefId, field: String },
    /// A field held a value of a kind it never legally carries.
    WrongValueKind {
        table: RefId,
        field: String,
        found: String,
    },
    /// An event log entry that is not a table reference.
    NonTableEntry { index: usize, found: String },
    /// The event log list was never declared.
    EventLogNotFound { name: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::InvalidNumber {
                element,
                attribute,
                value,
            } => write!(
                f,
                "<{}> attribute '{}' is not a number: '{}'",
                element, attribute, value
            ),
            Diagnostic::MissingAttribute { element, attribute } => {
                write!(f, "<{}> is missing attribute '{}'", element, attribute)
            }
            Diagnostic::DanglingReference { kind, id } => {
                write!(f, "{} reference {} was never declared", kind, id)
            }
            Diagnostic::UnresolvedKey { key } => {
                write!(f, "table key {} has no name string", key)
            }
            Diagnostic::ValueOutsideContainer { kind } => {
                write!(f, "<value> inside a {} ref was ignored", kind)
            }
            Diagnostic::ValueWithoutKey { table } => {
                write!(f, "<value> in table {} has no preceding <key>", table)
            }
            Diagnostic::MissingTimestamp { table } => {
                write!(f, "event table {} has no timestamp, entry skipped", table)
            }
            Diagnostic::MissingField { table, field } => {
                write!(f, "event table {} has no '{}' field", table, field)
            }
            Diagnostic::WrongValueKind {
                table,
                field,
                found,
            } => write!(
                f,
                "field '{}' in table {} holds an unexpected {} value",
                field, table, found
            ),
            Diagnostic::NonTableEntry { index, found } => {
                write!(f, "event log entry {} is a {} value, not a table", index, found)
            }
            Diagnostic::EventLogNotFound { name } => {
                write!(f, "no event log list named '{}' was found", name)
            }
        }
    }
}

/// Diagnostics in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "savegame diagnostic");
        self.0.push(diagnostic);
    }

    /// Append diagnostics that were already logged.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }
}
