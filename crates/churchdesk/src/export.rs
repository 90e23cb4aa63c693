//! CSV export of record collections.
//!
//! Column order and header names are fixed per record kind. Fields are
//! quoted only when they contain a comma, a double quote or a line break.
//! Free-text fields that a spreadsheet would read as a formula are prefixed
//! with `'`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::error::{Error, Result};
use crate::records::{Member, Offering, Record, RecordKind, Visitor};

/// Placeholder written for a visitor nobody is assigned to.
pub const NOT_ASSIGNED: &str = "Not assigned";

/// A record that can be written as one CSV row.
pub trait Exportable: Record {
    /// Column headers, in order.
    const HEADERS: &'static [&'static str];

    /// This record's fields, in header order.
    fn csv_fields(&self) -> Vec<String>;
}

fn date_field(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Prefix `value` with `'` when it starts with a spreadsheet formula trigger.
#[must_use]
pub fn neutralize_formula(value: &str) -> String {
    let trimmed = value.trim_start_matches([' ', '\t', '\r', '\n']);
    let leading = value.chars().next();
    let triggers = matches!(trimmed.chars().next(), Some('=' | '+' | '-' | '@'))
        || matches!(leading, Some('\t' | '\r'));
    if triggers && !trimmed.starts_with('\'') {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

fn opt_field(value: Option<&str>) -> String {
    value.map(neutralize_formula).unwrap_or_default()
}

impl Exportable for Member {
    const HEADERS: &'static [&'static str] = &[
        "Name",
        "Email",
        "Phone",
        "Join Date",
        "Status",
        "Ministry",
        "Address",
        "Date of Birth",
        "Marital Status",
        "Occupation",
        "Emergency Contact",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            neutralize_formula(&self.name),
            self.email.clone(),
            self.phone.clone(),
            date_field(self.join_date),
            self.status.to_string(),
            opt_field(self.ministry.as_deref()),
            opt_field(self.address.as_deref()),
            self.date_of_birth.map(date_field).unwrap_or_default(),
            opt_field(self.marital_status.as_deref()),
            opt_field(self.occupation.as_deref()),
            opt_field(self.emergency_contact.as_deref()),
        ]
    }
}

impl Exportable for Visitor {
    const HEADERS: &'static [&'static str] = &[
        "Name",
        "Email",
        "Phone",
        "Visit Date",
        "Follow-up Status",
        "How Heard",
        "Assigned To",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            neutralize_formula(&self.name),
            self.email.clone(),
            self.phone.clone(),
            date_field(self.visit_date),
            self.follow_up_status.to_string(),
            neutralize_formula(&self.how_heard),
            self.assigned_to
                .as_deref()
                .map_or_else(|| NOT_ASSIGNED.to_string(), neutralize_formula),
        ]
    }
}

impl Exportable for Offering {
    const HEADERS: &'static [&'static str] = &[
        "Date",
        "Service",
        "Total Amount",
        "Cash",
        "Transfer",
        "POS",
        "Collected By",
        "Counted By",
        "Notes",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            date_field(self.date),
            self.service.to_string(),
            self.total_amount().to_string(),
            self.cash_amount.to_string(),
            self.transfer_amount.to_string(),
            self.pos_amount.to_string(),
            neutralize_formula(&self.collected_by),
            neutralize_formula(&self.counted_by),
            opt_field(self.notes.as_deref()),
        ]
    }
}

/// Quote `field` if it contains a delimiter, quote or line break.
#[must_use]
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render a header row plus one row per record, joined by `\n` with no
/// trailing newline.
pub fn to_csv<'a, R: Exportable + 'a>(records: impl IntoIterator<Item = &'a R>) -> String {
    std::iter::once(csv_row(R::HEADERS))
        .chain(records.into_iter().map(|r| csv_row(&r.csv_fields())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// File name for an export of `kind` made on `date`,
/// e.g. `offerings-2023-06-04.csv`.
#[must_use]
pub fn export_file_name(kind: RecordKind, date: NaiveDate) -> String {
    format!("{}-{}.csv", kind.export_prefix(), date_field(date))
}

/// Write `records` as CSV into `dir`, creating it if needed.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write_export<'a, R: Exportable + 'a>(
    dir: &Path,
    date: NaiveDate,
    records: impl IntoIterator<Item = &'a R>,
) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let path = dir.join(export_file_name(R::KIND, date));
    let mut rows = 0_usize;
    let csv = to_csv(records.into_iter().inspect(|_| rows += 1));
    fs::write(&path, csv)?;

    info!("Exported {} {} records to {}", rows, R::KIND, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"amen\""), "\"say \"\"amen\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape_field(""), "");
    }

    #[test]
    fn test_neutralize_formula() {
        assert_eq!(neutralize_formula("=SUM(A1:A9)"), "'=SUM(A1:A9)");
        assert_eq!(neutralize_formula("  +cmd"), "'  +cmd");
        assert_eq!(neutralize_formula("@home"), "'@home");
        assert_eq!(neutralize_formula("\tindent"), "'\tindent");
        assert_eq!(neutralize_formula("'=already"), "'=already");
        assert_eq!(neutralize_formula("Building fund"), "Building fund");
        assert_eq!(neutralize_formula(""), "");
    }

    #[test]
    fn test_offering_notes_formula_neutralized() {
        let mut offering = Offering::seed().remove(0);
        offering.notes = Some("=HYPERLINK(\"http://x\",\"y\")".to_string());
        offering.collected_by = "-Deacon".to_string();

        let fields = offering.csv_fields();
        assert_eq!(fields[6], "'-Deacon");
        assert_eq!(fields[8], "'=HYPERLINK(\"http://x\",\"y\")");

        let csv = to_csv([&offering]);
        assert!(csv.ends_with(",\"'=HYPERLINK(\"\"http://x\"\",\"\"y\"\")\""));
    }

    #[test]
    fn test_phone_and_amounts_left_as_is() {
        let mut member = Member::seed().remove(0);
        member.phone = "+234 800 000 0000".to_string();
        assert_eq!(member.csv_fields()[2], "+234 800 000 0000");
    }

    #[test]
    fn test_two_records_three_lines() {
        let offerings = Offering::seed();
        let csv = to_csv(&offerings[1..3]);
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), 3);
        let width = Offering::HEADERS.len();
        for line in &lines {
            assert_eq!(line.split(',').count(), width);
        }
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_offering_row() {
        let offerings = Offering::seed();
        let csv = to_csv([&offerings[1]]);

        assert_eq!(
            csv,
            "Date,Service,Total Amount,Cash,Transfer,POS,Collected By,Counted By,Notes\n\
             2023-05-28,Sunday Morning Service,98000,38000,40000,20000,Deacon Sarah,Finance Team,"
        );
    }

    #[test]
    fn test_member_headers() {
        let csv = to_csv(&Vec::<Member>::new());
        assert_eq!(
            csv,
            "Name,Email,Phone,Join Date,Status,Ministry,Address,Date of Birth,\
             Marital Status,Occupation,Emergency Contact"
        );
    }

    #[test]
    fn test_member_optional_fields_blank() {
        let mut member = Member::seed().remove(0);
        member.ministry = None;
        member.date_of_birth = Some(date(1980, 2, 29));
        member.address = Some("12 Marina Road, Lagos".to_string());

        let fields = member.csv_fields();
        assert_eq!(fields.len(), Member::HEADERS.len());
        assert_eq!(fields[5], "");
        assert_eq!(fields[7], "1980-02-29");

        let csv = to_csv([&member]);
        assert!(csv.contains("\"12 Marina Road, Lagos\""));
    }

    #[test]
    fn test_visitor_unassigned() {
        let visitors = Visitor::seed();
        let fields = visitors[3].csv_fields();

        assert_eq!(fields[4], "Not Required");
        assert_eq!(fields[6], NOT_ASSIGNED);
    }

    #[test]
    fn test_notes_with_comma_and_quote_stay_one_field() {
        let mut offering = Offering::seed().remove(0);
        offering.notes = Some("Building fund, \"phase 2\"".to_string());

        let csv = to_csv([&offering]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(",\"Building fund, \"\"phase 2\"\"\""));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name(RecordKind::Visitor, date(2024, 3, 9)),
            "visitors-2024-03-09.csv"
        );
    }

    #[test]
    fn test_write_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports/june");
        let members = Member::seed();

        let path = write_export(&target, date(2023, 6, 4), &members).unwrap();

        assert_eq!(path, target.join("members-2023-06-04.csv"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), members.len() + 1);
        assert_eq!(written, to_csv(&members));
    }
}
