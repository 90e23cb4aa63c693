//! Church members.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    loose_key, merge_optional, non_blank, require_email, require_text, serde_blank,
    ParseValueError, Record, RecordId, RecordKind,
};
use crate::error::Result;

/// Membership status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemberStatus {
    /// Attending and involved.
    #[default]
    Active,
    /// No longer attending.
    Inactive,
}

impl MemberStatus {
    /// Every status, in display order.
    pub const ALL: [MemberStatus; 2] = [Self::Active, Self::Inactive];

    /// The persisted spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = loose_key(s);
        Self::ALL
            .into_iter()
            .find(|status| loose_key(status.as_str()) == key)
            .ok_or_else(|| ParseValueError::new("member status", s, &["Active", "Inactive"]))
    }
}

/// A registered church member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique identifier.
    pub id: RecordId,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Date the member joined.
    pub join_date: NaiveDate,
    /// Membership status.
    pub status: MemberStatus,
    /// Ministry or team the member serves in.
    #[serde(default, with = "serde_blank::text")]
    pub ministry: Option<String>,
    /// Home address.
    #[serde(default, with = "serde_blank::text")]
    pub address: Option<String>,
    /// Date of birth.
    #[serde(default, with = "serde_blank::date")]
    pub date_of_birth: Option<NaiveDate>,
    /// Marital status, free text.
    #[serde(default, with = "serde_blank::text")]
    pub marital_status: Option<String>,
    /// Occupation.
    #[serde(default, with = "serde_blank::text")]
    pub occupation: Option<String>,
    /// Emergency contact, free text.
    #[serde(default, with = "serde_blank::text")]
    pub emergency_contact: Option<String>,
}

/// Input for registering a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    /// Full name (required).
    pub name: String,
    /// Email address (required).
    pub email: String,
    /// Phone number (required).
    pub phone: String,
    /// Date the member joined (required).
    pub join_date: NaiveDate,
    /// Defaults to [`MemberStatus::Active`].
    pub status: Option<MemberStatus>,
    /// Ministry or team.
    pub ministry: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Marital status.
    pub marital_status: Option<String>,
    /// Occupation.
    pub occupation: Option<String>,
    /// Emergency contact.
    pub emergency_contact: Option<String>,
}

impl NewMember {
    /// Start a draft with the required fields and no optional details.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        join_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            join_date,
            status: None,
            ministry: None,
            address: None,
            date_of_birth: None,
            marital_status: None,
            occupation: None,
            emergency_contact: None,
        }
    }
}

/// Partial update for a member. `None` keeps the current value; an empty
/// string clears an optional text field.
///
/// `date_of_birth` is doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub status: Option<MemberStatus>,
    pub ministry: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub marital_status: Option<String>,
    pub occupation: Option<String>,
    pub emergency_contact: Option<String>,
}

impl Record for Member {
    type Draft = NewMember;
    type Patch = MemberPatch;

    const KIND: RecordKind = RecordKind::Member;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewMember) -> Result<Self> {
        let member = Self {
            id,
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            join_date: draft.join_date,
            status: draft.status.unwrap_or_default(),
            ministry: non_blank(draft.ministry),
            address: non_blank(draft.address),
            date_of_birth: draft.date_of_birth,
            marital_status: non_blank(draft.marital_status),
            occupation: non_blank(draft.occupation),
            emergency_contact: non_blank(draft.emergency_contact),
        };
        member.validate()?;
        Ok(member)
    }

    fn apply_patch(&mut self, patch: MemberPatch) -> Result<()> {
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
        if let Some(join_date) = patch.join_date {
            next.join_date = join_date;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            next.date_of_birth = date_of_birth;
        }
        merge_optional(&mut next.ministry, patch.ministry);
        merge_optional(&mut next.address, patch.address);
        merge_optional(&mut next.marital_status, patch.marital_status);
        merge_optional(&mut next.occupation, patch.occupation);
        merge_optional(&mut next.emergency_contact, patch.emergency_contact);

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
                    joined: (i32, u32, u32),
                    status: MemberStatus,
                    details: [&str; 5],
                    born: (i32, u32, u32)| {
            let [ministry, address, marital_status, occupation, emergency_contact] = details;
            Self {
                id,
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                join_date: ymd(joined),
                status,
                ministry: Some(ministry.to_string()),
                address: Some(address.to_string()),
                date_of_birth: Some(ymd(born)),
                marital_status: Some(marital_status.to_string()),
                occupation: Some(occupation.to_string()),
                emergency_contact: Some(emergency_contact.to_string()),
            }
        };

        vec![
            seed(
                1,
                "John Smith",
                "john.smith@email.com",
                "+1 (555) 123-4567",
                (2023, 1, 15),
                MemberStatus::Active,
                [
                    "Worship Team",
                    "123 Main St, City, State 12345",
                    "Married",
                    "Teacher",
                    "Jane Smith - +1 (555) 123-4568",
                ],
                (1985, 3, 20),
            ),
            seed(
                2,
                "Sarah Johnson",
                "sarah.j@email.com",
                "+1 (555) 987-6543",
                (2022, 11, 8),
                MemberStatus::Active,
                [
                    "Children Ministry",
                    "456 Oak Ave, City, State 12345",
                    "Single",
                    "Nurse",
                    "Robert Johnson - +1 (555) 987-6544",
                ],
                (1990, 7, 12),
            ),
            seed(
                3,
                "Michael Brown",
                "michael.b@email.com",
                "+1 (555) 456-7890",
                (2023, 3, 22),
                MemberStatus::Active,
                [
                    "Youth Ministry",
                    "789 Pine St, City, State 12345",
                    "Married",
                    "Engineer",
                    "Lisa Brown - +1 (555) 456-7891",
                ],
                (1988, 12, 5),
            ),
            seed(
                4,
                "Emily Davis",
                "emily.d@email.com",
                "+1 (555) 234-5678",
                (2022, 9, 14),
                MemberStatus::Inactive,
                [
                    "Prayer Team",
                    "321 Elm St, City, State 12345",
                    "Single",
                    "Designer",
                    "Mark Davis - +1 (555) 234-5679",
                ],
                (1992, 4, 18),
            ),
            seed(
                5,
                "David Wilson",
                "david.w@email.com",
                "+1 (555) 876-5432",
                (2023, 2, 10),
                MemberStatus::Active,
                [
                    "Ushering Team",
                    "654 Maple Ave, City, State 12345",
                    "Married",
                    "Manager",
                    "Carol Wilson - +1 (555) 876-5433",
                ],
                (1980, 9, 30),
            ),
        ]
    }
}

/// Seed dates are fixed literals.
pub(super) fn ymd((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> NewMember {
        NewMember::new(
            "Grace Okafor",
            "grace@email.com",
            "+234 801 000 0000",
            date(2024, 2, 4),
        )
    }

    #[test]
    fn test_member_status_parse() {
        assert_eq!("active".parse::<MemberStatus>().unwrap(), MemberStatus::Active);
        assert_eq!("INACTIVE".parse::<MemberStatus>().unwrap(), MemberStatus::Inactive);
        assert!("retired".parse::<MemberStatus>().is_err());
    }

    #[test]
    fn test_member_status_display() {
        assert_eq!(MemberStatus::Inactive.to_string(), "Inactive");
    }

    #[test]
    fn test_from_draft_fills_defaults() {
        let member = Member::from_draft(6, draft()).unwrap();

        assert_eq!(member.id, 6);
        assert_eq!(member.status, MemberStatus::Active);
        assert!(member.ministry.is_none());
        assert!(member.date_of_birth.is_none());
    }

    #[test]
    fn test_from_draft_trims_and_drops_blank_optionals() {
        let mut input = draft();
        input.name = "  Grace Okafor ".to_string();
        input.ministry = Some("   ".to_string());

        let member = Member::from_draft(1, input).unwrap();
        assert_eq!(member.name, "Grace Okafor");
        assert!(member.ministry.is_none());
    }

    #[test]
    fn test_from_draft_requires_name() {
        let mut input = draft();
        input.name = String::new();

        let err = Member::from_draft(1, input).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_from_draft_requires_valid_email() {
        let mut input = draft();
        input.email = "grace.email.com".to_string();

        assert!(Member::from_draft(1, input).unwrap_err().is_validation());
    }

    #[test]
    fn test_from_draft_requires_phone() {
        let mut input = draft();
        input.phone = " ".to_string();

        assert!(Member::from_draft(1, input).is_err());
    }

    #[test]
    fn test_apply_patch_merges_fields() {
        let mut member = Member::from_draft(1, draft()).unwrap();
        let patch = MemberPatch {
            status: Some(MemberStatus::Inactive),
            ministry: Some("Choir".to_string()),
            ..MemberPatch::default()
        };

        member.apply_patch(patch).unwrap();
        assert_eq!(member.status, MemberStatus::Inactive);
        assert_eq!(member.ministry.as_deref(), Some("Choir"));
        assert_eq!(member.name, "Grace Okafor");
    }

    #[test]
    fn test_apply_patch_clears_optional_with_empty_string() {
        let mut member = Member::seed().remove(0);
        let patch = MemberPatch {
            occupation: Some(String::new()),
            ..MemberPatch::default()
        };

        member.apply_patch(patch).unwrap();
        assert!(member.occupation.is_none());
    }

    #[test]
    fn test_apply_patch_sets_and_clears_date_of_birth() {
        let mut member = Member::from_draft(1, draft()).unwrap();
        member
            .apply_patch(MemberPatch {
                date_of_birth: Some(Some(date(1990, 3, 14))),
                ..MemberPatch::default()
            })
            .unwrap();
        assert_eq!(member.date_of_birth, Some(date(1990, 3, 14)));

        member.apply_patch(MemberPatch::default()).unwrap();
        assert_eq!(member.date_of_birth, Some(date(1990, 3, 14)));

        member
            .apply_patch(MemberPatch {
                date_of_birth: Some(None),
                ..MemberPatch::default()
            })
            .unwrap();
        assert!(member.date_of_birth.is_none());
    }

    #[test]
    fn test_rejected_patch_leaves_member_unchanged() {
        let mut member = Member::seed().remove(0);
        let before = member.clone();
        let patch = MemberPatch {
            ministry: Some("Choir".to_string()),
            email: Some("broken".to_string()),
            ..MemberPatch::default()
        };

        assert!(member.apply_patch(patch).is_err());
        assert_eq!(member, before);
    }

    #[test]
    fn test_seed_has_five_members_with_unique_ids() {
        let seed = Member::seed();
        assert_eq!(seed.len(), 5);

        let mut ids: Vec<_> = seed.iter().map(Record::id).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(seed[3].status, MemberStatus::Inactive);
        assert!(seed.iter().all(|m| m.validate().is_ok()));
    }

    #[test]
    fn test_persisted_layout_uses_camel_case() {
        let json = serde_json::to_value(&Member::seed()[0]).unwrap();

        assert_eq!(json["joinDate"], "2023-01-15");
        assert_eq!(json["dateOfBirth"], "1985-03-20");
        assert_eq!(json["emergencyContact"], "Jane Smith - +1 (555) 123-4568");
        assert_eq!(json["status"], "Active");
    }

    #[test]
    fn test_load_member_with_blank_optionals() {
        let json = r#"{
            "id": 9, "name": "Ada", "email": "ada@email.com", "phone": "1",
            "joinDate": "2024-01-01", "status": "Inactive",
            "ministry": "", "dateOfBirth": ""
        }"#;

        let member: Member = serde_json::from_str(json).unwrap();
        assert_eq!(member.status, MemberStatus::Inactive);
        assert!(member.ministry.is_none());
        assert!(member.date_of_birth.is_none());
        assert!(member.occupation.is_none());
    }
}
