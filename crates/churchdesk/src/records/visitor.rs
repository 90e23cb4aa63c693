//! Visitors and their follow-up progress.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::member::ymd;
use super::{
    loose_key, merge_optional, non_blank, require_email, require_text, serde_blank,
    ParseValueError, Record, RecordId, RecordKind,
};
use crate::error::Result;

/// How-heard value used when a visitor doesn't say.
const DEFAULT_HOW_HEARD: &str = "Other";

/// Pastoral follow-up progress for a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum FollowUpStatus {
    /// Nobody has reached out yet.
    #[default]
    Pending,
    /// Contact has started.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Follow-up finished.
    Completed,
    /// No follow-up wanted.
    #[serde(rename = "Not Required")]
    NotRequired,
}

impl FollowUpStatus {
    /// Every status, in display order.
    pub const ALL: [FollowUpStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::NotRequired,
    ];

    /// The persisted spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::NotRequired => "Not Required",
        }
    }
}

impl fmt::Display for FollowUpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FollowUpStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = loose_key(s);
        Self::ALL
            .into_iter()
            .find(|status| loose_key(status.as_str()) == key)
            .ok_or_else(|| {
                let names = Self::ALL.map(Self::as_str);
                ParseValueError::new("follow-up status", s, &names)
            })
    }
}

fn default_how_heard() -> String {
    DEFAULT_HOW_HEARD.to_string()
}

/// A person who visited a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    /// Unique identifier.
    pub id: RecordId,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Date of the visit.
    pub visit_date: NaiveDate,
    /// Follow-up progress.
    pub follow_up_status: FollowUpStatus,
    /// How the visitor heard about the church.
    #[serde(default = "default_how_heard")]
    pub how_heard: String,
    /// Who is responsible for the follow-up. `None` means unassigned.
    #[serde(default, deserialize_with = "serde_blank::text::deserialize")]
    pub assigned_to: Option<String>,
    /// Home address.
    #[serde(default, with = "serde_blank::text")]
    pub address: Option<String>,
    /// Ministries the visitor asked about.
    #[serde(default, rename = "interestedIn")]
    pub interests: Vec<String>,
    /// Free-form notes.
    #[serde(default, with = "serde_blank::text")]
    pub notes: Option<String>,
}

/// Input for recording a visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisitor {
    /// Full name (required).
    pub name: String,
    /// Email address (required).
    pub email: String,
    /// Phone number (required).
    pub phone: String,
    /// Date of the visit (required).
    pub visit_date: NaiveDate,
    /// Defaults to [`FollowUpStatus::Pending`].
    pub follow_up_status: Option<FollowUpStatus>,
    /// Defaults to `Other`.
    pub how_heard: Option<String>,
    /// Follow-up owner.
    pub assigned_to: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// Ministries of interest.
    pub interests: Vec<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl NewVisitor {
    /// Start a draft with the required fields and no optional details.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        visit_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            visit_date,
            follow_up_status: None,
            how_heard: None,
            assigned_to: None,
            address: None,
            interests: Vec::new(),
            notes: None,
        }
    }
}

/// Partial update for a visitor. `None` keeps the current value.
///
/// `assigned_to` is doubly optional: `Some(None)` unassigns the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct VisitorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub follow_up_status: Option<FollowUpStatus>,
    pub how_heard: Option<String>,
    pub assigned_to: Option<Option<String>>,
    pub address: Option<String>,
    pub interests: Option<Vec<String>>,
    pub notes: Option<String>,
}

fn clean_interests(interests: Vec<String>) -> Vec<String> {
    interests
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect()
}

impl Record for Visitor {
    type Draft = NewVisitor;
    type Patch = VisitorPatch;

    const KIND: RecordKind = RecordKind::Visitor;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewVisitor) -> Result<Self> {
        let visitor = Self {
            id,
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            visit_date: draft.visit_date,
            follow_up_status: draft.follow_up_status.unwrap_or_default(),
            how_heard: non_blank(draft.how_heard).unwrap_or_else(default_how_heard),
            assigned_to: non_blank(draft.assigned_to),
            address: non_blank(draft.address),
            interests: clean_interests(draft.interests),
            notes: non_blank(draft.notes),
        };
        visitor.validate()?;
        Ok(visitor)
    }

    fn apply_patch(&mut self, patch: VisitorPatch) -> Result<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            next.email = email.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            next.phone = phone.trim().to_string();
        }
        if let Some(visit_date) = patch.visit_date {
            next.visit_date = visit_date;
        }
        if let Some(status) = patch.follow_up_status {
            next.follow_up_status = status;
        }
        if let Some(how_heard) = patch.how_heard {
            next.how_heard = non_blank(Some(how_heard)).unwrap_or_else(default_how_heard);
        }
        if let Some(assigned_to) = patch.assigned_to {
            next.assigned_to = non_blank(assigned_to);
        }
        if let Some(interests) = patch.interests {
            next.interests = clean_interests(interests);
        }
        merge_optional(&mut next.address, patch.address);
        merge_optional(&mut next.notes, patch.notes);

        next.validate()?;
        *self = next;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_email(&self.email)?;
        require_text("phone", &self.phone)?;
        Ok(())
    }

    fn seed() -> Vec<Self> {
        let seed = |id: RecordId,
                    name: &str,
                    email: &str,
                    phone: &str,
                    visited: (i32, u32, u32),
                    status: FollowUpStatus,
                    how_heard: &str,
                    assigned_to: Option<&str>| Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            visit_date: ymd(visited),
            follow_up_status: status,
            how_heard: how_heard.to_string(),
            assigned_to: assigned_to.map(str::to_string),
            address: None,
            interests: Vec::new(),
            notes: None,
        };

        vec![
            seed(
                1,
                "Alex Thompson",
                "alex.thompson@email.com",
                "+1 (555) 987-1234",
                (2023, 6, 4),
                FollowUpStatus::Pending,
                "Friend/Family",
                Some("Pastor John"),
            ),
            seed(
                2,
                "Maria Rodriguez",
                "maria.r@email.com",
                "+1 (555) 456-7890",
                (2023, 6, 4),
                FollowUpStatus::InProgress,
                "Website",
                Some("Elder Sarah"),
            ),
            seed(
                3,
                "David Kim",
                "david.k@email.com",
                "+1 (555) 234-5678",
                (2023, 5, 28),
                FollowUpStatus::Completed,
                "Walk-in",
                Some("Deacon Michael"),
            ),
            seed(
                4,
                "Lisa Johnson",
                "lisa.j@email.com",
                "+1 (555) 876-5432",
                (2023, 5, 21),
                FollowUpStatus::NotRequired,
                "Social Media",
                None,
            ),
            seed(
                5,
                "James Wilson",
                "james.w@email.com",
                "+1 (555) 345-6789",
                (2023, 5, 21),
                FollowUpStatus::Pending,
                "Advertisement",
                Some("Ministry Leader Emily"),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewVisitor {
        NewVisitor::new(
            "Chidi Eze",
            "chidi@email.com",
            "+234 802 000 0000",
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        )
    }

    #[test]
    fn test_follow_up_status_parse() {
        assert_eq!(
            "in progress".parse::<FollowUpStatus>().unwrap(),
            FollowUpStatus::InProgress
        );
        assert_eq!(
            "not-required".parse::<FollowUpStatus>().unwrap(),
            FollowUpStatus::NotRequired
        );
        let err = "done".parse::<FollowUpStatus>().unwrap_err();
        assert!(err.to_string().contains("Not Required"));
    }

    #[test]
    fn test_follow_up_status_serde_spelling() {
        let json = serde_json::to_string(&FollowUpStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let parsed: FollowUpStatus = serde_json::from_str("\"Not Required\"").unwrap();
        assert_eq!(parsed, FollowUpStatus::NotRequired);
    }

    #[test]
    fn test_from_draft_fills_defaults() {
        let visitor = Visitor::from_draft(6, draft()).unwrap();

        assert_eq!(visitor.follow_up_status, FollowUpStatus::Pending);
        assert_eq!(visitor.how_heard, "Other");
        assert!(visitor.assigned_to.is_none());
        assert!(visitor.interests.is_empty());
    }

    #[test]
    fn test_from_draft_drops_blank_assignee_and_interests() {
        let mut input = draft();
        input.assigned_to = Some("  ".to_string());
        input.interests = vec!["Choir".to_string(), " ".to_string()];

        let visitor = Visitor::from_draft(1, input).unwrap();
        assert!(visitor.assigned_to.is_none());
        assert_eq!(visitor.interests, vec!["Choir".to_string()]);
    }

    #[test]
    fn test_from_draft_requires_name() {
        let mut input = draft();
        input.name = String::new();

        assert!(Visitor::from_draft(1, input).unwrap_err().is_validation());
    }

    #[test]
    fn test_patch_unassigns() {
        let mut visitor = Visitor::seed().remove(0);
        let patch = VisitorPatch {
            assigned_to: Some(None),
            follow_up_status: Some(FollowUpStatus::InProgress),
            ..VisitorPatch::default()
        };

        visitor.apply_patch(patch).unwrap();
        assert!(visitor.assigned_to.is_none());
        assert_eq!(visitor.follow_up_status, FollowUpStatus::InProgress);
    }

    #[test]
    fn test_patch_without_assignee_keeps_it() {
        let mut visitor = Visitor::seed().remove(0);
        let patch = VisitorPatch {
            notes: Some("Called on Tuesday".to_string()),
            ..VisitorPatch::default()
        };

        visitor.apply_patch(patch).unwrap();
        assert_eq!(visitor.assigned_to.as_deref(), Some("Pastor John"));
        assert_eq!(visitor.notes.as_deref(), Some("Called on Tuesday"));
    }

    #[test]
    fn test_rejected_patch_leaves_visitor_unchanged() {
        let mut visitor = Visitor::seed().remove(1);
        let before = visitor.clone();
        let patch = VisitorPatch {
            name: Some("   ".to_string()),
            how_heard: Some("Radio".to_string()),
            ..VisitorPatch::default()
        };

        assert!(visitor.apply_patch(patch).is_err());
        assert_eq!(visitor, before);
    }

    #[test]
    fn test_seed_matches_known_rows() {
        let seed = Visitor::seed();
        assert_eq!(seed.len(), 5);
        assert!(seed[3].assigned_to.is_none());
        assert_eq!(seed[1].follow_up_status, FollowUpStatus::InProgress);
    }

    #[test]
    fn test_load_visitor_without_optional_fields() {
        let json = r#"{
            "id": 1, "name": "Alex Thompson", "email": "alex@email.com",
            "phone": "1", "visitDate": "2023-06-04", "followUpStatus": "Pending",
            "howHeard": "Friend/Family", "assignedTo": null
        }"#;

        let visitor: Visitor = serde_json::from_str(json).unwrap();
        assert!(visitor.assigned_to.is_none());
        assert!(visitor.address.is_none());
        assert!(visitor.interests.is_empty());
    }

    #[test]
    fn test_unassigned_persists_as_null() {
        let json = serde_json::to_value(&Visitor::seed()[3]).unwrap();
        assert!(json["assignedTo"].is_null());
        assert_eq!(json["followUpStatus"], "Not Required");
        assert!(json["interestedIn"].as_array().unwrap().is_empty());
    }
}
