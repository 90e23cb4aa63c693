//! Command-line interface for churchdesk.
//!
//! This module provides the CLI structure for the `chdesk` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CheckinCommand, ConfigCommand, MemberAddArgs, MemberCommand, MemberExportArgs,
    MemberFilterArgs, MemberListArgs, MemberUpdateArgs, OfferingAddArgs, OfferingCommand,
    OfferingExportArgs, OfferingFilterArgs, OfferingListArgs, OfferingUpdateArgs, OutputFormat,
    RemoveArgs, StatsArgs, StatusCommand, VisitorAddArgs, VisitorCommand, VisitorExportArgs,
    VisitorFilterArgs, VisitorListArgs, VisitorUpdateArgs,
};

/// chdesk - Church office records
///
/// Keeps the member directory, visitor follow-ups and offering records,
/// with filtering, summary figures, CSV export and check-in links.
#[derive(Debug, Parser)]
#[command(name = "chdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show database location and record counts
    Status(StatusCommand),

    /// Manage the member directory
    #[command(subcommand)]
    Member(MemberCommand),

    /// Manage visitors and their follow-up
    #[command(subcommand)]
    Visitor(VisitorCommand),

    /// Manage offering records
    #[command(subcommand)]
    Offering(OfferingCommand),

    /// Manage digital check-in
    #[command(subcommand)]
    Checkin(CheckinCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Assignee, Choice};
    use crate::records::{FollowUpStatus, MemberStatus, ServiceType};
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_debug() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "chdesk");
    }

    #[test]
    fn test_verbosity_quiet() {
        assert_eq!(
            status_cli(0, true).verbosity(),
            crate::logging::Verbosity::Quiet
        );
    }

    #[test]
    fn test_verbosity_normal() {
        assert_eq!(
            status_cli(0, false).verbosity(),
            crate::logging::Verbosity::Normal
        );
    }

    #[test]
    fn test_verbosity_verbose() {
        assert_eq!(
            status_cli(1, false).verbosity(),
            crate::logging::Verbosity::Verbose
        );
    }

    #[test]
    fn test_verbosity_trace() {
        assert_eq!(
            status_cli(2, false).verbosity(),
            crate::logging::Verbosity::Trace
        );
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["chdesk", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }

    #[test]
    fn test_parse_member_list_defaults() {
        let cli = Cli::try_parse_from(["chdesk", "member", "list"]).unwrap();
        let Command::Member(MemberCommand::List(args)) = cli.command else {
            panic!("expected member list");
        };
        assert_eq!(args.filter.status, Choice::Any);
        assert_eq!(args.filter.ministry, Choice::Any);
        assert_eq!(args.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_member_list_filters() {
        let cli = Cli::try_parse_from([
            "chdesk",
            "member",
            "list",
            "--status",
            "inactive",
            "--ministry",
            "Choir",
            "-s",
            "smith",
            "--format",
            "json",
        ])
        .unwrap();
        let Command::Member(MemberCommand::List(args)) = cli.command else {
            panic!("expected member list");
        };
        assert_eq!(args.filter.status, Choice::Is(MemberStatus::Inactive));
        assert_eq!(args.filter.ministry, Choice::Is("Choir".to_string()));
        assert_eq!(args.filter.search.as_deref(), Some("smith"));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_bad_status_rejected() {
        let result = Cli::try_parse_from(["chdesk", "member", "list", "--status", "retired"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_member_add_requires_name() {
        let result = Cli::try_parse_from([
            "chdesk",
            "member",
            "add",
            "--email",
            "a@b.c",
            "--phone",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_visitor_filters() {
        let cli = Cli::try_parse_from([
            "chdesk",
            "visitor",
            "list",
            "--status",
            "in-progress",
            "--assignee",
            "unassigned",
        ])
        .unwrap();
        let Command::Visitor(VisitorCommand::List(args)) = cli.command else {
            panic!("expected visitor list");
        };
        assert_eq!(
            args.filter.follow_up_status,
            Choice::Is(FollowUpStatus::InProgress)
        );
        assert_eq!(args.filter.assignee, Assignee::Unassigned);
    }

    #[test]
    fn test_parse_visitor_update_conflict() {
        let result = Cli::try_parse_from([
            "chdesk",
            "visitor",
            "update",
            "2",
            "--assigned-to",
            "Pastor John",
            "--unassign",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_member_update_date_of_birth_conflict() {
        let result = Cli::try_parse_from([
            "chdesk",
            "member",
            "update",
            "1",
            "--date-of-birth",
            "1990-03-14",
            "--clear-date-of-birth",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_visitor_add_interests() {
        let cli = Cli::try_parse_from([
            "chdesk",
            "visitor",
            "add",
            "--name",
            "Tunde Bello",
            "--email",
            "tunde@example.com",
            "--phone",
            "0802",
            "--interest",
            "Choir",
            "--interest",
            "Youth",
        ])
        .unwrap();
        let Command::Visitor(VisitorCommand::Add(args)) = cli.command else {
            panic!("expected visitor add");
        };
        assert_eq!(args.interests, vec!["Choir", "Youth"]);
    }

    #[test]
    fn test_parse_offering_add() {
        let cli = Cli::try_parse_from([
            "chdesk",
            "offering",
            "add",
            "--service",
            "midweek service",
            "--cash",
            "20000",
            "--collected-by",
            "Elder John",
            "--date",
            "2023-06-07",
        ])
        .unwrap();
        let Command::Offering(OfferingCommand::Add(args)) = cli.command else {
            panic!("expected offering add");
        };
        assert_eq!(args.service, Some(ServiceType::Midweek));
        assert_eq!(args.cash, Some(20_000.0));
        assert_eq!(args.collected_by, "Elder John");
    }

    #[test]
    fn test_parse_offering_export_dir() {
        let cli = Cli::try_parse_from([
            "chdesk",
            "offering",
            "export",
            "--dir",
            "/tmp/out",
            "--min-amount",
            "1000",
        ])
        .unwrap();
        let Command::Offering(OfferingCommand::Export(args)) = cli.command else {
            panic!("expected offering export");
        };
        assert_eq!(args.dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(args.filter.min_amount, Some(1_000.0));
    }

    #[test]
    fn test_parse_remove_yes() {
        let cli = Cli::try_parse_from(["chdesk", "offering", "remove", "4", "-y"]).unwrap();
        let Command::Offering(OfferingCommand::Remove(args)) = cli.command else {
            panic!("expected offering remove");
        };
        assert_eq!(args.id, 4);
        assert!(args.yes);
    }

    #[test]
    fn test_parse_checkin_add() {
        let cli =
            Cli::try_parse_from(["chdesk", "checkin", "add", "Prayer Meeting", "6:30 AM"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Checkin(CheckinCommand::Add { .. })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["chdesk", "-c", "/custom/config.toml", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["chdesk", "-v", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_with_quiet() {
        let args = vec!["chdesk", "-q", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.quiet);
    }
}
