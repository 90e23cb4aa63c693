//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands, and turns
//! filter and edit flags into the library's filter and patch types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::filter::{
    AmountRange, Assignee, Choice, MemberFilter, OfferingFilter, TextSearch, VisitorFilter,
};
use crate::records::{
    FollowUpStatus, MemberPatch, MemberStatus, NewMember, NewOffering, NewVisitor, OfferingPatch,
    RecordId, ServiceType, VisitorPatch,
};

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Member directory commands.
#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// List members matching the filters
    List(MemberListArgs),
    /// Register a new member
    Add(MemberAddArgs),
    /// Change fields of an existing member
    Update(MemberUpdateArgs),
    /// Remove a member
    Remove(RemoveArgs),
    /// Show membership figures
    Stats(StatsArgs),
    /// Write matching members to a CSV file
    Export(MemberExportArgs),
}

/// Visitor follow-up commands.
#[derive(Debug, Subcommand)]
pub enum VisitorCommand {
    /// List visitors matching the filters
    List(VisitorListArgs),
    /// Record a new visitor
    Add(VisitorAddArgs),
    /// Change fields of an existing visitor
    Update(VisitorUpdateArgs),
    /// Remove a visitor
    Remove(RemoveArgs),
    /// Show follow-up figures
    Stats(StatsArgs),
    /// Write matching visitors to a CSV file
    Export(VisitorExportArgs),
}

/// Offering record commands.
#[derive(Debug, Subcommand)]
pub enum OfferingCommand {
    /// List offerings matching the filters
    List(OfferingListArgs),
    /// Record a new offering
    Add(OfferingAddArgs),
    /// Change fields of an existing offering
    Update(OfferingUpdateArgs),
    /// Remove an offering
    Remove(RemoveArgs),
    /// Show offering totals and trend
    Stats(StatsArgs),
    /// Write matching offerings to a CSV file
    Export(OfferingExportArgs),
}

/// Digital check-in commands.
#[derive(Debug, Subcommand)]
pub enum CheckinCommand {
    /// List check-in services
    Services {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add a check-in service
    Add {
        /// Service name, e.g. "Prayer Meeting"
        name: String,

        /// Start time, e.g. "6:30 AM"
        time: String,
    },

    /// Start or stop check-in for a service
    Toggle {
        /// Service id, e.g. "sunday-morning"
        id: String,
    },

    /// Print a fresh check-in link for a service
    Url {
        /// Service id, e.g. "sunday-morning"
        id: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Arguments for removing a record.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Record id
    pub id: RecordId,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the stats subcommands.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

// Members

/// Member filter flags.
#[derive(Debug, Clone, Args)]
pub struct MemberFilterArgs {
    /// Search name and email
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only members with this status ("all" for any)
    #[arg(long, default_value = "all")]
    pub status: Choice<MemberStatus>,

    /// Only members serving in this ministry ("all" for any)
    #[arg(long, default_value = "all")]
    pub ministry: Choice<String>,

    /// Only members who joined on this date (YYYY-MM-DD)
    #[arg(long)]
    pub join_date: Option<NaiveDate>,
}

impl MemberFilterArgs {
    /// Build the filter these flags describe.
    #[must_use]
    pub fn to_filter(&self) -> MemberFilter {
        MemberFilter {
            search: TextSearch::new(self.search.as_deref().unwrap_or_default()),
            status: self.status.clone(),
            ministry: self.ministry.clone(),
            join_date: self.join_date,
        }
    }
}

/// `member list` arguments.
#[derive(Debug, Args)]
pub struct MemberListArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub filter: MemberFilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// `member export` arguments.
#[derive(Debug, Args)]
pub struct MemberExportArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub filter: MemberFilterArgs,

    /// Directory to write into (defaults to the configured export directory)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// `member add` arguments.
#[derive(Debug, Args)]
pub struct MemberAddArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Phone number
    #[arg(long)]
    pub phone: String,

    /// Join date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub join_date: Option<NaiveDate>,

    /// Membership status (defaults to Active)
    #[arg(long)]
    pub status: Option<MemberStatus>,

    /// Ministry served in
    #[arg(long)]
    pub ministry: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub date_of_birth: Option<NaiveDate>,

    /// Marital status
    #[arg(long)]
    pub marital_status: Option<String>,

    /// Occupation
    #[arg(long)]
    pub occupation: Option<String>,

    /// Emergency contact
    #[arg(long)]
    pub emergency_contact: Option<String>,
}

impl MemberAddArgs {
    /// Build the create input, joining on `today` unless a date was given.
    #[must_use]
    pub fn into_draft(self, today: NaiveDate) -> NewMember {
        NewMember {
            status: self.status,
            ministry: self.ministry,
            address: self.address,
            date_of_birth: self.date_of_birth,
            marital_status: self.marital_status,
            occupation: self.occupation,
            emergency_contact: self.emergency_contact,
            ..NewMember::new(
                self.name,
                self.email,
                self.phone,
                self.join_date.unwrap_or(today),
            )
        }
    }
}

/// `member update` arguments. Omitted flags keep their value; an empty
/// string clears an optional field.
#[derive(Debug, Args)]
pub struct MemberUpdateArgs {
    /// Member id
    pub id: RecordId,

    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Join date (YYYY-MM-DD)
    #[arg(long)]
    pub join_date: Option<NaiveDate>,

    /// Membership status
    #[arg(long)]
    pub status: Option<MemberStatus>,

    /// Ministry served in
    #[arg(long)]
    pub ministry: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long, conflicts_with = "clear_date_of_birth")]
    pub date_of_birth: Option<NaiveDate>,

    /// Remove the recorded date of birth
    #[arg(long)]
    pub clear_date_of_birth: bool,

    /// Marital status
    #[arg(long)]
    pub marital_status: Option<String>,

    /// Occupation
    #[arg(long)]
    pub occupation: Option<String>,

    /// Emergency contact
    #[arg(long)]
    pub emergency_contact: Option<String>,
}

impl MemberUpdateArgs {
    /// Split into the target id and the patch.
    #[must_use]
    pub fn into_patch(self) -> (RecordId, MemberPatch) {
        let date_of_birth = if self.clear_date_of_birth {
            Some(None)
        } else {
            self.date_of_birth.map(Some)
        };
        let patch = MemberPatch {
            name: self.name,
            email: self.email,
            phone: self.phone,
            join_date: self.join_date,
            status: self.status,
            ministry: self.ministry,
            address: self.address,
            date_of_birth,
            marital_status: self.marital_status,
            occupation: self.occupation,
            emergency_contact: self.emergency_contact,
        };
        (self.id, patch)
    }
}

// Visitors

/// Visitor filter flags.
#[derive(Debug, Clone, Args)]
pub struct VisitorFilterArgs {
    /// Search name and email
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only visitors with this follow-up status ("all" for any)
    #[arg(long = "status", default_value = "all")]
    pub follow_up_status: Choice<FollowUpStatus>,

    /// Only visitors who heard about the church this way ("all" for any)
    #[arg(long, default_value = "all")]
    pub how_heard: Choice<String>,

    /// Only visitors who came on this date (YYYY-MM-DD)
    #[arg(long)]
    pub visit_date: Option<NaiveDate>,

    /// Only visitors assigned to this person ("unassigned" for nobody)
    #[arg(long, default_value = "all")]
    pub assignee: Assignee,
}

impl VisitorFilterArgs {
    /// Build the filter these flags describe.
    #[must_use]
    pub fn to_filter(&self) -> VisitorFilter {
        VisitorFilter {
            search: TextSearch::new(self.search.as_deref().unwrap_or_default()),
            follow_up_status: self.follow_up_status.clone(),
            how_heard: self.how_heard.clone(),
            visit_date: self.visit_date,
            assignee: self.assignee.clone(),
        }
    }
}

/// `visitor list` arguments.
#[derive(Debug, Args)]
pub struct VisitorListArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub filter: VisitorFilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// `visitor export` arguments.
#[derive(Debug, Args)]
pub struct VisitorExportArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub filter: VisitorFilterArgs,

    /// Directory to write into (defaults to the configured export directory)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// `visitor add` arguments.
#[derive(Debug, Args)]
pub struct VisitorAddArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Phone number
    #[arg(long)]
    pub phone: String,

    /// Visit date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub visit_date: Option<NaiveDate>,

    /// Follow-up status (defaults to Pending)
    #[arg(long)]
    pub status: Option<FollowUpStatus>,

    /// How they heard about the church (defaults to Other)
    #[arg(long)]
    pub how_heard: Option<String>,

    /// Person responsible for follow-up
    #[arg(long)]
    pub assigned_to: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Area of interest (repeatable)
    #[arg(long = "interest", value_name = "INTEREST")]
    pub interests: Vec<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl VisitorAddArgs {
    /// Build the create input, visiting on `today` unless a date was given.
    #[must_use]
    pub fn into_draft(self, today: NaiveDate) -> NewVisitor {
        NewVisitor {
            follow_up_status: self.status,
            how_heard: self.how_heard,
            assigned_to: self.assigned_to,
            address: self.address,
            interests: self.interests,
            notes: self.notes,
            ..NewVisitor::new(
                self.name,
                self.email,
                self.phone,
                self.visit_date.unwrap_or(today),
            )
        }
    }
}

/// `visitor update` arguments. Omitted flags keep their value.
#[derive(Debug, Args)]
pub struct VisitorUpdateArgs {
    /// Visitor id
    pub id: RecordId,

    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Visit date (YYYY-MM-DD)
    #[arg(long)]
    pub visit_date: Option<NaiveDate>,

    /// Follow-up status
    #[arg(long)]
    pub status: Option<FollowUpStatus>,

    /// How they heard about the church
    #[arg(long)]
    pub how_heard: Option<String>,

    /// Person responsible for follow-up
    #[arg(long, conflicts_with = "unassign")]
    pub assigned_to: Option<String>,

    /// Remove the follow-up assignment
    #[arg(long)]
    pub unassign: bool,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Area of interest, replacing the current list (repeatable)
    #[arg(long = "interest", value_name = "INTEREST")]
    pub interests: Vec<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl VisitorUpdateArgs {
    /// Split into the target id and the patch.
    #[must_use]
    pub fn into_patch(self) -> (RecordId, VisitorPatch) {
        let assigned_to = if self.unassign {
            Some(None)
        } else {
            self.assigned_to.map(Some)
        };
        let interests = (!self.interests.is_empty()).then_some(self.interests);

        let patch = VisitorPatch {
            name: self.name,
            email: self.email,
            phone: self.phone,
            visit_date: self.visit_date,
            follow_up_status: self.status,
            how_heard: self.how_heard,
            assigned_to,
            address: self.address,
            interests,
            notes: self.notes,
        };
        (self.id, patch)
    }
}

// Offerings

/// Offering filter flags.
#[derive(Debug, Clone, Args)]
pub struct OfferingFilterArgs {
    /// Search service and collector
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only this service ("all" for any)
    #[arg(long, default_value = "all")]
    pub service: Choice<ServiceType>,

    /// Only offerings on this date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Only offerings collected by this person ("all" for any)
    #[arg(long, default_value = "all")]
    pub collector: Choice<String>,

    /// Smallest total to include
    #[arg(long)]
    pub min_amount: Option<f64>,

    /// Largest total to include
    #[arg(long)]
    pub max_amount: Option<f64>,
}

impl OfferingFilterArgs {
    /// Build the filter these flags describe.
    #[must_use]
    pub fn to_filter(&self) -> OfferingFilter {
        OfferingFilter {
            search: TextSearch::new(self.search.as_deref().unwrap_or_default()),
            service: self.service.clone(),
            date: self.date,
            collector: self.collector.clone(),
            amount: AmountRange::new(self.min_amount, self.max_amount),
        }
    }
}

/// `offering list` arguments.
#[derive(Debug, Args)]
pub struct OfferingListArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub filter: OfferingFilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// `offering export` arguments.
#[derive(Debug, Args)]
pub struct OfferingExportArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub filter: OfferingFilterArgs,

    /// Directory to write into (defaults to the configured export directory)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// `offering add` arguments.
#[derive(Debug, Args)]
pub struct OfferingAddArgs {
    /// Service date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Service type (defaults to Sunday Morning Service)
    #[arg(long)]
    pub service: Option<ServiceType>,

    /// Cash received
    #[arg(long)]
    pub cash: Option<f64>,

    /// Bank transfers received
    #[arg(long)]
    pub transfer: Option<f64>,

    /// Card payments received
    #[arg(long)]
    pub pos: Option<f64>,

    /// Person who collected the offering
    #[arg(long)]
    pub collected_by: String,

    /// Who counted it (defaults to Finance Team)
    #[arg(long)]
    pub counted_by: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl OfferingAddArgs {
    /// Build the create input, dated `today` unless a date was given.
    #[must_use]
    pub fn into_draft(self, today: NaiveDate) -> NewOffering {
        NewOffering {
            service: self.service,
            cash_amount: self.cash,
            transfer_amount: self.transfer,
            pos_amount: self.pos,
            counted_by: self.counted_by,
            notes: self.notes,
            ..NewOffering::new(self.date.unwrap_or(today), self.collected_by)
        }
    }
}

/// `offering update` arguments. Omitted flags keep their value.
#[derive(Debug, Args)]
pub struct OfferingUpdateArgs {
    /// Offering id
    pub id: RecordId,

    /// Service date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Service type
    #[arg(long)]
    pub service: Option<ServiceType>,

    /// Cash received
    #[arg(long)]
    pub cash: Option<f64>,

    /// Bank transfers received
    #[arg(long)]
    pub transfer: Option<f64>,

    /// Card payments received
    #[arg(long)]
    pub pos: Option<f64>,

    /// Person who collected the offering
    #[arg(long)]
    pub collected_by: Option<String>,

    /// Who counted it
    #[arg(long)]
    pub counted_by: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl OfferingUpdateArgs {
    /// Split into the target id and the patch.
    #[must_use]
    pub fn into_patch(self) -> (RecordId, OfferingPatch) {
        let patch = OfferingPatch {
            date: self.date,
            service: self.service,
            cash_amount: self.cash,
            transfer_amount: self.transfer,
            pos_amount: self.pos,
            collected_by: self.collected_by,
            counted_by: self.counted_by,
            notes: self.notes,
        };
        (self.id, patch)
    }
}
