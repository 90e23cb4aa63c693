//! Record types kept by churchdesk.
//!
//! Three independent kinds of record live side by side: members, visitors and
//! offerings. They never reference each other. Each kind knows its storage
//! key, how to build itself from a validated input, how to merge a patch, and
//! which rows it starts with when nothing has been stored yet.

mod member;
mod offering;
pub(crate) mod serde_blank;
mod visitor;

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};

pub use member::{Member, MemberPatch, MemberStatus, NewMember};
pub use offering::{NewOffering, Offering, OfferingPatch, ServiceType, COLLECTORS};
pub use visitor::{FollowUpStatus, NewVisitor, Visitor, VisitorPatch};

/// Identifier shared by all record kinds.
pub type RecordId = i64;

/// The kinds of record churchdesk stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Church members.
    Member,
    /// First-time and returning visitors.
    Visitor,
    /// Offering collections per service.
    Offering,
}

impl RecordKind {
    /// Every kind, in display order.
    pub const ALL: [RecordKind; 3] = [Self::Member, Self::Visitor, Self::Offering];

    /// Key the whole collection is persisted under.
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Member => "churchMembers",
            Self::Visitor => "churchVisitors",
            Self::Offering => "churchOfferings",
        }
    }

    /// Prefix used for export file names.
    #[must_use]
    pub fn export_prefix(self) -> &'static str {
        match self {
            Self::Member => "members",
            Self::Visitor => "visitors",
            Self::Offering => "offerings",
        }
    }

    /// Singular lower-case name used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Visitor => "visitor",
            Self::Offering => "offering",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A record that can live in a [`RecordStore`](crate::store::RecordStore).
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// Fully typed input for creating a record.
    type Draft;
    /// Partial update; absent fields keep their current value.
    type Patch;

    /// Which kind of record this is.
    const KIND: RecordKind;

    /// The record's identifier.
    fn id(&self) -> RecordId;

    /// Build a record from a draft, filling defaults for optional fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a required field is missing or invalid.
    fn from_draft(id: RecordId, draft: Self::Draft) -> Result<Self>;

    /// Merge a patch over the record.
    ///
    /// The merged result is validated before it replaces `self`, so a
    /// rejected patch leaves the record exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the merged record is invalid.
    fn apply_patch(&mut self, patch: Self::Patch) -> Result<()>;

    /// Check the record's required fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the first problem found.
    fn validate(&self) -> Result<()>;

    /// Rows a fresh installation starts with.
    fn seed() -> Vec<Self>;
}

/// Failure to parse one of the record enumerations from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseValueError {
    kind: &'static str,
    value: String,
    expected: String,
}

impl ParseValueError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

/// Loose comparison key for enum names typed on a command line.
///
/// `in-progress`, `IN_PROGRESS` and `In Progress` all compare equal, and
/// apostrophes are ignored so `childrens service` finds `Children's Service`.
pub(crate) fn loose_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| match c {
            '-' | '_' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Reject blank required text.
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Reject addresses that do not look like `local@domain`.
pub(crate) fn require_email(value: &str) -> Result<()> {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    require_text("email", value)?;
    let email =
        EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("Invalid regex pattern"));
    if !email.is_match(value.trim()) {
        return Err(Error::validation(format!(
            "'{value}' is not a valid email address"
        )));
    }
    Ok(())
}

/// Treat blank optional text as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Replace an optional field when a patch carries a value for it.
/// A blank value clears the field.
pub(crate) fn merge_optional(field: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *field = non_blank(Some(value));
    }
}
