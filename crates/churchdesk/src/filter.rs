//! Record filtering.
//!
//! Every filter field has an inactive state that lets all records through.
//! A record is kept only when every active field accepts it.

use std::convert::Infallible;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::records::{FollowUpStatus, Member, MemberStatus, Offering, ServiceType, Visitor};

/// A boolean test over one record.
pub trait Predicate<R> {
    /// Whether `record` passes.
    fn matches(&self, record: &R) -> bool;

    /// Records that pass, in collection order.
    fn apply<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Case-insensitive substring search over several text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSearch {
    needle: String,
}

impl TextSearch {
    /// Search for `term`. A blank term matches everything.
    #[must_use]
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.trim().to_lowercase(),
        }
    }

    /// Whether a term has been set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.needle.is_empty()
    }

    /// True if any of `fields` contains the term.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        !self.is_active()
            || fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

/// Exact-match filter on a categorical value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice<T> {
    /// Inactive.
    #[default]
    Any,
    /// Only records whose value equals this one.
    Is(T),
}

impl<T: PartialEq> Choice<T> {
    /// Whether a value has been chosen.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Is(_))
    }

    /// Whether `value` passes.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Self::Any => true,
            Self::Is(wanted) => wanted == value,
        }
    }

    /// Like [`Choice::admits`] for a field that may be unset. An unset field
    /// only passes an inactive choice.
    pub fn admits_opt(&self, value: Option<&T>) -> bool {
        match self {
            Self::Any => true,
            Self::Is(wanted) => value == Some(wanted),
        }
    }
}

impl<T: FromStr> FromStr for Choice<T> {
    type Err = T::Err;

    /// `all` (any case) and the empty string select [`Choice::Any`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::Any);
        }
        trimmed.parse().map(Self::Is)
    }
}

/// Filter on a visitor's follow-up owner.
///
/// Unassigned is a distinct state from "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Assignee {
    /// Inactive.
    #[default]
    Any,
    /// Only visitors nobody is assigned to.
    Unassigned,
    /// Only visitors assigned to this person.
    Named(String),
}

impl Assignee {
    /// Whether `assigned_to` passes.
    #[must_use]
    pub fn admits(&self, assigned_to: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Unassigned => assigned_to.is_none(),
            Self::Named(name) => assigned_to == Some(name.as_str()),
        }
    }
}

impl FromStr for Assignee {
    type Err = Infallible;

    /// `all` or empty is [`Assignee::Any`]; `unassigned` or `none` is
    /// [`Assignee::Unassigned`]; anything else names a person.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::Any)
        } else if trimmed.eq_ignore_ascii_case("unassigned") || trimmed.eq_ignore_ascii_case("none")
        {
            Ok(Self::Unassigned)
        } else {
            Ok(Self::Named(trimmed.to_string()))
        }
    }
}

/// Inclusive bounds on an amount. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AmountRange {
    /// Smallest amount that passes.
    pub min: Option<f64>,
    /// Largest amount that passes.
    pub max: Option<f64>,
}

impl AmountRange {
    /// A range with the given bounds.
    #[must_use]
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Whether `amount` lies within the bounds.
    #[must_use]
    pub fn contains(&self, amount: f64) -> bool {
        self.min.map_or(true, |min| amount >= min) && self.max.map_or(true, |max| amount <= max)
    }
}

fn admits_date(wanted: Option<NaiveDate>, actual: NaiveDate) -> bool {
    wanted.map_or(true, |date| date == actual)
}

/// Filter over the member directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberFilter {
    /// Searches name and email.
    pub search: TextSearch,
    /// Membership status.
    pub status: Choice<MemberStatus>,
    /// Ministry served in.
    pub ministry: Choice<String>,
    /// Exact join date.
    pub join_date: Option<NaiveDate>,
}

impl MemberFilter {
    /// Reset every field to inactive.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Predicate<Member> for MemberFilter {
    fn matches(&self, member: &Member) -> bool {
        self.search
            .matches_any([member.name.as_str(), member.email.as_str()])
            && self.status.admits(&member.status)
            && self.ministry.admits_opt(member.ministry.as_ref())
            && admits_date(self.join_date, member.join_date)
    }
}

/// Filter over visitors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitorFilter {
    /// Searches name and email.
    pub search: TextSearch,
    /// Follow-up progress.
    pub follow_up_status: Choice<FollowUpStatus>,
    /// How the visitor heard about the church.
    pub how_heard: Choice<String>,
    /// Exact visit date.
    pub visit_date: Option<NaiveDate>,
    /// Follow-up owner.
    pub assignee: Assignee,
}

impl VisitorFilter {
    /// Reset every field to inactive.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Predicate<Visitor> for VisitorFilter {
    fn matches(&self, visitor: &Visitor) -> bool {
        self.search
            .matches_any([visitor.name.as_str(), visitor.email.as_str()])
            && self.follow_up_status.admits(&visitor.follow_up_status)
            && self.how_heard.admits(&visitor.how_heard)
            && admits_date(self.visit_date, visitor.visit_date)
            && self.assignee.admits(visitor.assigned_to.as_deref())
    }
}

/// Filter over offering records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferingFilter {
    /// Searches service name and collector.
    pub search: TextSearch,
    /// Service type.
    pub service: Choice<ServiceType>,
    /// Exact service date.
    pub date: Option<NaiveDate>,
    /// Who collected the offering.
    pub collector: Choice<String>,
    /// Bounds on the total amount.
    pub amount: AmountRange,
}

impl OfferingFilter {
    /// Reset every field to inactive.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Predicate<Offering> for OfferingFilter {
    fn matches(&self, offering: &Offering) -> bool {
        self.search
            .matches_any([offering.service.as_str(), offering.collected_by.as_str()])
            && self.service.admits(&offering.service)
            && admits_date(self.date, offering.date)
            && self.collector.admits(&offering.collected_by)
            && self.amount.contains(offering.total_amount())
    }
}
