//! Summary figures derived from record collections.
//!
//! Everything here is a pure function of the records passed in. Pass the
//! whole collection for dashboard totals or a filtered selection for a
//! narrower view.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::records::{FollowUpStatus, Member, MemberStatus, Offering, ServiceType, Visitor};

/// Whether `date` falls in the same calendar month as `today`.
fn same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

/// `part` as a percentage of `total`, or 0 when the total is 0.
#[must_use]
pub fn percentage(part: f64, total: f64) -> f64 {
    if total.abs() < f64::EPSILON {
        0.0
    } else {
        part / total * 100.0
    }
}

/// Membership counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberStats {
    /// All members.
    pub total: usize,
    /// Members with status Active.
    pub active: usize,
    /// Members with status Inactive.
    pub inactive: usize,
    /// Members who joined in the current month.
    pub joined_this_month: usize,
}

impl MemberStats {
    /// Count `members`, treating `today` as the current date.
    pub fn compute<'a>(members: impl IntoIterator<Item = &'a Member>, today: NaiveDate) -> Self {
        members.into_iter().fold(Self::default(), |mut stats, m| {
            stats.total += 1;
            match m.status {
                MemberStatus::Active => stats.active += 1,
                MemberStatus::Inactive => stats.inactive += 1,
            }
            if same_month(m.join_date, today) {
                stats.joined_this_month += 1;
            }
            stats
        })
    }
}

/// Visitor follow-up counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisitorStats {
    /// All visitors.
    pub total: usize,
    /// Follow-ups not started.
    pub pending: usize,
    /// Follow-ups under way.
    pub in_progress: usize,
    /// Follow-ups finished.
    pub completed: usize,
    /// Visitors needing no follow-up.
    pub not_required: usize,
    /// Visitors who came this month.
    pub visited_this_month: usize,
    /// Visitor count per how-heard source, in first-seen order.
    pub by_source: Vec<(String, usize)>,
}

impl VisitorStats {
    /// Count `visitors`, treating `today` as the current date.
    pub fn compute<'a>(visitors: impl IntoIterator<Item = &'a Visitor>, today: NaiveDate) -> Self {
        let mut stats = Self::default();
        for v in visitors {
            stats.total += 1;
            match v.follow_up_status {
                FollowUpStatus::Pending => stats.pending += 1,
                FollowUpStatus::InProgress => stats.in_progress += 1,
                FollowUpStatus::Completed => stats.completed += 1,
                FollowUpStatus::NotRequired => stats.not_required += 1,
            }
            if same_month(v.visit_date, today) {
                stats.visited_this_month += 1;
            }
            match stats.by_source.iter_mut().find(|(s, _)| *s == v.how_heard) {
                Some((_, count)) => *count += 1,
                None => stats.by_source.push((v.how_heard.clone(), 1)),
            }
        }
        stats
    }

    /// Count for one follow-up status.
    #[must_use]
    pub fn count(&self, status: FollowUpStatus) -> usize {
        match status {
            FollowUpStatus::Pending => self.pending,
            FollowUpStatus::InProgress => self.in_progress,
            FollowUpStatus::Completed => self.completed,
            FollowUpStatus::NotRequired => self.not_required,
        }
    }
}

/// How a set of offerings split across payment methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PaymentBreakdown {
    /// Cash total.
    pub cash: f64,
    /// Bank transfer total.
    pub transfer: f64,
    /// POS/card total.
    pub pos: f64,
}

impl PaymentBreakdown {
    /// Sum of all three methods.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cash + self.transfer + self.pos
    }

    /// Cash share of the total, in percent.
    #[must_use]
    pub fn cash_percent(&self) -> f64 {
        percentage(self.cash, self.total())
    }

    /// Transfer share of the total, in percent.
    #[must_use]
    pub fn transfer_percent(&self) -> f64 {
        percentage(self.transfer, self.total())
    }

    /// POS share of the total, in percent.
    #[must_use]
    pub fn pos_percent(&self) -> f64 {
        percentage(self.pos, self.total())
    }
}

/// Offering totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OfferingStats {
    /// Number of offerings.
    pub count: usize,
    /// Sum of all totals.
    pub total: f64,
    /// Mean total per offering, 0 when there are none.
    pub average: f64,
    /// Totals per payment method.
    pub payments: PaymentBreakdown,
    /// Transfer plus POS.
    pub digital_total: f64,
    /// Sum of totals dated in the current month.
    pub this_month: f64,
    /// Sum of totals per service type, for services that appear.
    pub by_service: Vec<(ServiceType, f64)>,
}

impl OfferingStats {
    /// Sum `offerings`, treating `today` as the current date.
    pub fn compute<'a>(offerings: impl IntoIterator<Item = &'a Offering>, today: NaiveDate) -> Self {
        let mut stats = Self::default();
        let mut per_service = [0.0_f64; ServiceType::ALL.len()];
        let mut seen = [false; ServiceType::ALL.len()];

        for o in offerings {
            let amount = o.total_amount();
            stats.count += 1;
            stats.total += amount;
            stats.payments.cash += o.cash_amount;
            stats.payments.transfer += o.transfer_amount;
            stats.payments.pos += o.pos_amount;
            stats.digital_total += o.digital_amount();
            if same_month(o.date, today) {
                stats.this_month += amount;
            }
            if let Some(slot) = ServiceType::ALL.iter().position(|s| *s == o.service) {
                per_service[slot] += amount;
                seen[slot] = true;
            }
        }

        if stats.count > 0 {
            #[allow(clippy::cast_precision_loss)]
            let count = stats.count as f64;
            stats.average = stats.total / count;
        }
        stats.by_service = ServiceType::ALL
            .iter()
            .zip(per_service)
            .zip(seen)
            .filter(|(_, seen)| *seen)
            .map(|((service, amount), _)| (*service, amount))
            .collect();
        stats
    }
}

/// One bar of the offering trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Short date label such as `Jun 4`.
    pub label: String,
    /// Offering total.
    pub value: f64,
}

/// Offering totals for charting, in reverse insertion order.
pub fn offering_trend<'a, I>(offerings: I) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Offering>,
    I::IntoIter: DoubleEndedIterator,
{
    offerings
        .into_iter()
        .rev()
        .map(|o| TrendPoint {
            label: o.date.format("%b %-d").to_string(),
            value: o.total_amount(),
        })
        .collect()
}

/// Distinct non-blank values in first-seen order.
fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Ministries members serve in.
#[must_use]
pub fn ministry_options(members: &[Member]) -> Vec<String> {
    distinct(members.iter().filter_map(|m| m.ministry.as_deref()))
}

/// How-heard sources visitors gave.
#[must_use]
pub fn how_heard_options(visitors: &[Visitor]) -> Vec<String> {
    distinct(visitors.iter().map(|v| v.how_heard.as_str()))
}

/// People visitors are assigned to.
#[must_use]
pub fn assignee_options(visitors: &[Visitor]) -> Vec<String> {
    distinct(visitors.iter().filter_map(|v| v.assigned_to.as_deref()))
}

/// People who have collected offerings.
#[must_use]
pub fn collector_options(offerings: &[Offering]) -> Vec<String> {
    distinct(offerings.iter().map(|o| o.collected_by.as_str()))
}

/// Render `amount` with its currency code and thousands separators,
/// e.g. `NGN 125,000.00`.
#[must_use]
pub fn format_amount(amount: f64, currency: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{currency} {sign}{grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Record;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_percentage_zero_total() {
        assert!(approx(percentage(5.0, 0.0), 0.0));
        assert!(approx(percentage(25.0, 100.0), 25.0));
    }

    #[test]
    fn test_member_stats() {
        let members = Member::seed();
        let today = members[0].join_date;
        let stats = MemberStats::compute(&members, today);

        assert_eq!(stats.total, members.len());
        assert_eq!(stats.active + stats.inactive, stats.total);
        assert!(stats.joined_this_month >= 1);
    }

    #[test]
    fn test_member_stats_empty() {
        let stats = MemberStats::compute(&[], date(2024, 1, 1));
        assert_eq!(stats, MemberStats::default());
    }

    #[test]
    fn test_visitor_stats() {
        let visitors = Visitor::seed();
        let stats = VisitorStats::compute(&visitors, date(2023, 6, 20));

        assert_eq!(stats.total, 5);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.not_required, 1);
        assert_eq!(stats.count(FollowUpStatus::Pending), 2);
        assert_eq!(stats.visited_this_month, 2);
        assert_eq!(stats.by_source.len(), 5);
        assert_eq!(stats.by_source[0], ("Friend/Family".to_string(), 1));
    }

    #[test]
    fn test_offering_stats_on_seed() {
        let offerings = Offering::seed();
        let stats = OfferingStats::compute(&offerings, date(2023, 5, 30));

        assert_eq!(stats.count, 5);
        assert!(approx(stats.total, 396_000.0));
        assert!(approx(stats.average, 79_200.0));
        assert!(approx(stats.payments.cash, 163_000.0));
        assert!(approx(stats.payments.transfer, 163_000.0));
        assert!(approx(stats.payments.pos, 70_000.0));
        assert!(approx(stats.digital_total, 233_000.0));
        assert!(approx(stats.this_month, 271_000.0));
        assert_eq!(
            stats.by_service,
            vec![
                (ServiceType::SundayMorning, 333_000.0),
                (ServiceType::Midweek, 63_000.0),
            ]
        );
    }

    #[test]
    fn test_offering_stats_empty_has_no_nan() {
        let stats = OfferingStats::compute(&[], date(2024, 1, 1));

        assert_eq!(stats.count, 0);
        assert!(approx(stats.average, 0.0));
        assert!(approx(stats.payments.cash_percent(), 0.0));
        assert!(approx(stats.payments.transfer_percent(), 0.0));
        assert!(approx(stats.payments.pos_percent(), 0.0));
        assert!(stats.by_service.is_empty());
    }

    #[test]
    fn test_payment_percentages_sum_to_hundred() {
        let offerings = Offering::seed();
        let payments = OfferingStats::compute(&offerings, date(2024, 1, 1)).payments;
        let sum = payments.cash_percent() + payments.transfer_percent() + payments.pos_percent();

        assert!(approx(sum, 100.0));
    }

    #[test]
    fn test_offering_stats_over_filtered_selection() {
        let offerings = Offering::seed();
        let midweek: Vec<&Offering> = offerings
            .iter()
            .filter(|o| o.service == ServiceType::Midweek)
            .collect();

        let stats = OfferingStats::compute(midweek, date(2024, 1, 1));
        assert_eq!(stats.count, 2);
        assert!(approx(stats.total, 63_000.0));
    }

    #[test]
    fn test_offering_trend_reverses_insertion_order() {
        let offerings = Offering::seed();
        let trend = offering_trend(&offerings);

        let labels: Vec<&str> = trend.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["May 17", "May 21", "May 24", "May 28", "Jun 4"]);
        assert!(approx(trend[4].value, 125_000.0));
    }

    #[test]
    fn test_option_lists() {
        let visitors = Visitor::seed();
        let offerings = Offering::seed();

        assert_eq!(assignee_options(&visitors).len(), 4);
        assert_eq!(how_heard_options(&visitors)[1], "Website");
        assert_eq!(
            collector_options(&offerings),
            vec!["Deacon Michael", "Deacon Sarah", "Elder John", "Elder Sarah"]
        );
    }

    #[test]
    fn test_ministry_options_skip_unset() {
        let mut members = Member::seed();
        for m in &mut members {
            m.ministry = None;
        }
        members[0].ministry = Some("Choir".to_string());
        members[1].ministry = Some("Choir".to_string());

        assert_eq!(ministry_options(&members), vec!["Choir".to_string()]);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(125_000.0, "NGN"), "NGN 125,000.00");
        assert_eq!(format_amount(0.0, "NGN"), "NGN 0.00");
        assert_eq!(format_amount(999.999, "USD"), "USD 1,000.00");
        assert_eq!(format_amount(1_234_567.5, "NGN"), "NGN 1,234,567.50");
        assert_eq!(format_amount(-42.1, "NGN"), "NGN -42.10");
    }
}
