//! Offering collections and the services they were taken at.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::member::ymd;
use super::{
    loose_key, merge_optional, non_blank, require_text, serde_blank, ParseValueError, Record,
    RecordId, RecordKind,
};
use crate::error::{Error, Result};

/// People who usually collect offerings. Suggested, not enforced.
pub const COLLECTORS: [&str; 6] = [
    "Deacon Michael",
    "Deacon Sarah",
    "Elder John",
    "Elder Mary",
    "Usher Team Leader",
    "Finance Committee",
];

const DEFAULT_COUNTED_BY: &str = "Finance Team";

/// The service an offering was collected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ServiceType {
    /// Sunday morning worship.
    #[default]
    #[serde(rename = "Sunday Morning Service")]
    SundayMorning,
    /// Sunday evening worship.
    #[serde(rename = "Sunday Evening Service")]
    SundayEvening,
    /// Midweek service.
    #[serde(rename = "Midweek Service")]
    Midweek,
    /// Prayer meeting.
    #[serde(rename = "Prayer Meeting")]
    PrayerMeeting,
    /// Special or one-off service.
    #[serde(rename = "Special Service")]
    Special,
    /// Youth service.
    #[serde(rename = "Youth Service")]
    Youth,
    /// Children's church.
    #[serde(rename = "Children's Service")]
    Children,
}

impl ServiceType {
    /// Every service type, in display order.
    pub const ALL: [ServiceType; 7] = [
        Self::SundayMorning,
        Self::SundayEvening,
        Self::Midweek,
        Self::PrayerMeeting,
        Self::Special,
        Self::Youth,
        Self::Children,
    ];

    /// The persisted spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SundayMorning => "Sunday Morning Service",
            Self::SundayEvening => "Sunday Evening Service",
            Self::Midweek => "Midweek Service",
            Self::PrayerMeeting => "Prayer Meeting",
            Self::Special => "Special Service",
            Self::Youth => "Youth Service",
            Self::Children => "Children's Service",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ParseValueError;

    /// Accepts the full name or the name without its trailing "Service".
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = loose_key(s);
        Self::ALL
            .into_iter()
            .find(|service| {
                let full = loose_key(service.as_str());
                full == key || full.trim_end_matches(" service") == key
            })
            .ok_or_else(|| {
                let names = Self::ALL.map(Self::as_str);
                ParseValueError::new("service", s, &names)
            })
    }
}

/// One offering collection.
///
/// The total is never stored on its own: [`Offering::total_amount`] always
/// sums the three payment methods. Persisted rows still carry a
/// `totalAmount` field, which is written on save and ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredOffering", into = "StoredOffering")]
pub struct Offering {
    /// Unique identifier.
    pub id: RecordId,
    /// Date of the service.
    pub date: NaiveDate,
    /// Service the offering was collected at.
    pub service: ServiceType,
    /// Cash received.
    pub cash_amount: f64,
    /// Bank transfers received.
    pub transfer_amount: f64,
    /// Card payments received.
    pub pos_amount: f64,
    /// Who collected the offering.
    pub collected_by: String,
    /// Who counted it.
    pub counted_by: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Offering {
    /// Sum of cash, transfer and POS amounts.
    #[must_use]
    pub fn total_amount(&self) -> f64 {
        self.cash_amount + self.transfer_amount + self.pos_amount
    }

    /// Transfer plus POS, the amounts that did not arrive as cash.
    #[must_use]
    pub fn digital_amount(&self) -> f64 {
        self.transfer_amount + self.pos_amount
    }
}

/// Persisted layout of an offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredOffering {
    id: RecordId,
    date: NaiveDate,
    service: ServiceType,
    #[serde(default)]
    total_amount: f64,
    #[serde(default)]
    cash_amount: f64,
    #[serde(default)]
    transfer_amount: f64,
    #[serde(default)]
    pos_amount: f64,
    collected_by: String,
    #[serde(default)]
    counted_by: String,
    #[serde(default, with = "serde_blank::text")]
    notes: Option<String>,
}

impl From<StoredOffering> for Offering {
    fn from(stored: StoredOffering) -> Self {
        Self {
            id: stored.id,
            date: stored.date,
            service: stored.service,
            cash_amount: stored.cash_amount,
            transfer_amount: stored.transfer_amount,
            pos_amount: stored.pos_amount,
            collected_by: stored.collected_by,
            counted_by: stored.counted_by,
            notes: stored.notes,
        }
    }
}

impl From<Offering> for StoredOffering {
    fn from(offering: Offering) -> Self {
        Self {
            total_amount: offering.total_amount(),
            id: offering.id,
            date: offering.date,
            service: offering.service,
            cash_amount: offering.cash_amount,
            transfer_amount: offering.transfer_amount,
            pos_amount: offering.pos_amount,
            collected_by: offering.collected_by,
            counted_by: offering.counted_by,
            notes: offering.notes,
        }
    }
}

/// Input for recording an offering. Missing amounts count as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOffering {
    /// Date of the service (required).
    pub date: NaiveDate,
    /// Defaults to [`ServiceType::SundayMorning`].
    pub service: Option<ServiceType>,
    /// Cash received.
    pub cash_amount: Option<f64>,
    /// Transfers received.
    pub transfer_amount: Option<f64>,
    /// Card payments received.
    pub pos_amount: Option<f64>,
    /// Who collected the offering (required).
    pub collected_by: String,
    /// Defaults to `Finance Team`.
    pub counted_by: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl NewOffering {
    /// Start a draft for a collection with no amounts yet.
    #[must_use]
    pub fn new(date: NaiveDate, collected_by: impl Into<String>) -> Self {
        Self {
            date,
            service: None,
            cash_amount: None,
            transfer_amount: None,
            pos_amount: None,
            collected_by: collected_by.into(),
            counted_by: None,
            notes: None,
        }
    }
}

/// Partial update for an offering. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(missing_docs)]
pub struct OfferingPatch {
    pub date: Option<NaiveDate>,
    pub service: Option<ServiceType>,
    pub cash_amount: Option<f64>,
    pub transfer_amount: Option<f64>,
    pub pos_amount: Option<f64>,
    pub collected_by: Option<String>,
    pub counted_by: Option<String>,
    pub notes: Option<String>,
}

fn require_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(format!(
            "{field} must be a non-negative amount, got {value}"
        )));
    }
    Ok(())
}

impl Record for Offering {
    type Draft = NewOffering;
    type Patch = OfferingPatch;

    const KIND: RecordKind = RecordKind::Offering;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewOffering) -> Result<Self> {
        let offering = Self {
            id,
            date: draft.date,
            service: draft.service.unwrap_or_default(),
            cash_amount: draft.cash_amount.unwrap_or(0.0),
            transfer_amount: draft.transfer_amount.unwrap_or(0.0),
            pos_amount: draft.pos_amount.unwrap_or(0.0),
            collected_by: draft.collected_by.trim().to_string(),
            counted_by: non_blank(draft.counted_by)
                .map_or_else(|| DEFAULT_COUNTED_BY.to_string(), |c| c.trim().to_string()),
            notes: non_blank(draft.notes),
        };
        offering.validate()?;
        Ok(offering)
    }

    fn apply_patch(&mut self, patch: OfferingPatch) -> Result<()> {
        let mut next = self.clone();
        if let Some(date) = patch.date {
            next.date = date;
        }
        if let Some(service) = patch.service {
            next.service = service;
        }
        if let Some(cash) = patch.cash_amount {
            next.cash_amount = cash;
        }
        if let Some(transfer) = patch.transfer_amount {
            next.transfer_amount = transfer;
        }
        if let Some(pos) = patch.pos_amount {
            next.pos_amount = pos;
        }
        if let Some(collected_by) = patch.collected_by {
            next.collected_by = collected_by.trim().to_string();
        }
        if let Some(counted_by) = patch.counted_by {
            next.counted_by = non_blank(Some(counted_by))
                .map_or_else(|| DEFAULT_COUNTED_BY.to_string(), |c| c.trim().to_string());
        }
        merge_optional(&mut next.notes, patch.notes);

        next.validate()?;
        *self = next;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        require_amount("cash amount", self.cash_amount)?;
        require_amount("transfer amount", self.transfer_amount)?;
        require_amount("POS amount", self.pos_amount)?;
        let total = self.total_amount();
        if !total.is_finite() {
            return Err(Error::validation("total amount is too large"));
        }
        if total <= 0.0 {
            return Err(Error::validation(
                "please enter at least one amount greater than zero",
            ));
        }
        require_text("collected by", &self.collected_by)?;
        Ok(())
    }

    fn seed() -> Vec<Self> {
        let seed = |id: RecordId,
                    date: (i32, u32, u32),
                    service: ServiceType,
                    (cash, transfer, pos): (f64, f64, f64),
                    collected_by: &str,
                    notes: &str| Self {
            id,
            date: ymd(date),
            service,
            cash_amount: cash,
            transfer_amount: transfer,
            pos_amount: pos,
            collected_by: collected_by.to_string(),
            counted_by: DEFAULT_COUNTED_BY.to_string(),
            notes: non_blank(Some(notes.to_string())),
        };

        vec![
            seed(
                1,
                (2023, 6, 4),
                ServiceType::SundayMorning,
                (45_000.0, 50_000.0, 30_000.0),
                "Deacon Michael",
                "Special offering for building fund included",
            ),
            seed(
                2,
                (2023, 5, 28),
                ServiceType::SundayMorning,
                (38_000.0, 40_000.0, 20_000.0),
                "Deacon Sarah",
                "",
            ),
            seed(
                3,
                (2023, 5, 24),
                ServiceType::Midweek,
                (20_000.0, 15_000.0, 0.0),
                "Elder John",
                "Lower attendance due to weather",
            ),
            seed(
                4,
                (2023, 5, 21),
                ServiceType::SundayMorning,
                (42_000.0, 48_000.0, 20_000.0),
                "Deacon Michael",
                "",
            ),
            seed(
                5,
                (2023, 5, 17),
                ServiceType::Midweek,
                (18_000.0, 10_000.0, 0.0),
                "Elder Sarah",
                "",
            ),
        ]
    }
}
