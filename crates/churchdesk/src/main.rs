//! `chdesk` - CLI for churchdesk
//!
//! This binary provides the command-line interface for the church office
//! records: members, visitors, offerings and check-in.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate, Utc};
use clap::Parser;

use churchdesk::checkin::checkin_url;
use churchdesk::cli::{
    CheckinCommand, Cli, Command, ConfigCommand, MemberCommand, OfferingCommand, OutputFormat,
    RemoveArgs, VisitorCommand,
};
use churchdesk::export::{write_export, Exportable, NOT_ASSIGNED};
use churchdesk::filter::Predicate;
use churchdesk::stats::{
    assignee_options, collector_options, format_amount, how_heard_options, ministry_options,
    offering_trend, percentage, MemberStats, OfferingStats, VisitorStats,
};
use churchdesk::{
    init_logging, Config, Dashboard, Error, KeyValueStore, Member, Offering, Record, RecordStore,
    Visitor,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> CliResult {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Member(member_cmd) => handle_member(&config, member_cmd),
        Command::Visitor(visitor_cmd) => handle_visitor(&config, visitor_cmd),
        Command::Offering(offering_cmd) => handle_offering(&config, offering_cmd),
        Command::Checkin(checkin_cmd) => handle_checkin(&config, checkin_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn handle_status(config: &Config, json: bool) -> CliResult {
    let dashboard = Dashboard::open(config)?;
    let stats = dashboard.storage().stats()?;
    let summary = dashboard.summary(today());

    if json {
        let sources: serde_json::Map<String, serde_json::Value> = dashboard
            .sources()
            .iter()
            .map(|(kind, source)| (kind.to_string(), format!("{source:?}").into()))
            .collect();
        let status = serde_json::json!({
            "church": config.church.name,
            "database_path": config.database_path(),
            "database_bytes": stats.db_size_bytes,
            "stored_keys": stats.total_keys,
            "members": dashboard.members().len(),
            "visitors": dashboard.visitors().len(),
            "offerings": dashboard.offerings().len(),
            "active_checkins": summary.active_checkins,
            "sources": sources,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{} records", config.church.name);
        println!("{}", "-".repeat(config.church.name.len() + 8));
        println!("Database:      {}", config.database_path().display());
        println!("Size:          {} bytes in {} keys", stats.db_size_bytes, stats.total_keys);
        println!(
            "Members:       {} ({} active)",
            dashboard.members().len(),
            summary.members.active
        );
        println!(
            "Visitors:      {} ({} pending follow-up)",
            dashboard.visitors().len(),
            summary.visitors.pending
        );
        println!(
            "Offerings:     {} ({} this month)",
            dashboard.offerings().len(),
            format_amount(summary.offerings.this_month, &config.church.currency)
        );
        println!("Check-in open: {}", summary.active_checkins);
    }
    Ok(())
}

/// Ask a yes/no question on the terminal. Anything but `y`/`yes` is a no.
fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn remove_record<R, S>(
    store: &mut RecordStore<R, S>,
    args: &RemoveArgs,
    describe: impl Fn(&R) -> String,
) -> CliResult
where
    R: Record,
    S: KeyValueStore,
{
    let result = store.delete(args.id, |record| {
        args.yes || confirm(&format!("Remove {} {}?", R::KIND, describe(record)))
    });
    match result {
        Ok(removed) => {
            println!("Removed {} {}", R::KIND, describe(&removed));
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            println!("Nothing removed.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn export_records<'a, R: Exportable + 'a>(
    config: &Config,
    dir: Option<PathBuf>,
    records: Vec<&'a R>,
) -> CliResult {
    let count = records.len();
    let dir = dir.unwrap_or_else(|| config.export_dir());
    let path = write_export(&dir, today(), records)?;
    println!("Exported {count} {} records to {}", R::KIND, path.display());
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_member(config: &Config, cmd: MemberCommand) -> CliResult {
    let mut dashboard = Dashboard::open(config)?;

    match cmd {
        MemberCommand::List(args) => {
            let filter = args.filter.to_filter();
            let members = filter.apply(dashboard.members().records());
            match args.format {
                OutputFormat::Json => print_json(&members)?,
                OutputFormat::Table => print_members(&members),
            }
        }
        MemberCommand::Add(args) => {
            let member = dashboard.members_mut().create(args.into_draft(today()))?;
            println!("Added member {} ({})", member.id, member.name);
        }
        MemberCommand::Update(args) => {
            let (id, patch) = args.into_patch();
            let member = dashboard.members_mut().update(id, patch)?;
            println!("Updated member {} ({})", member.id, member.name);
        }
        MemberCommand::Remove(args) => {
            remove_record(dashboard.members_mut(), &args, |m: &Member| {
                format!("{} ({})", m.id, m.name)
            })?;
        }
        MemberCommand::Stats(args) => {
            let records = dashboard.members().records();
            let stats = MemberStats::compute(records, today());
            let ministries = ministry_options(records);
            if args.json {
                print_json(&serde_json::json!({
                    "stats": stats,
                    "ministries": ministries,
                }))?;
            } else {
                #[allow(clippy::cast_precision_loss)]
                let active_share = percentage(stats.active as f64, stats.total as f64);
                println!("Members:           {}", stats.total);
                println!("Active:            {} ({active_share:.1}%)", stats.active);
                println!("Inactive:          {}", stats.inactive);
                println!("Joined this month: {}", stats.joined_this_month);
                println!("Ministries:        {}", ministries.join(", "));
            }
        }
        MemberCommand::Export(args) => {
            let filter = args.filter.to_filter();
            let members = filter.apply(dashboard.members().records());
            export_records(config, args.dir, members)?;
        }
    }
    Ok(())
}

fn print_members(members: &[&Member]) {
    println!(
        "{:<4} {:<22} {:<28} {:<18} {:<10} {:<8} MINISTRY",
        "ID", "NAME", "EMAIL", "PHONE", "JOINED", "STATUS"
    );
    for m in members {
        println!(
            "{:<4} {:<22} {:<28} {:<18} {:<10} {:<8} {}",
            m.id,
            m.name,
            m.email,
            m.phone,
            m.join_date,
            m.status,
            m.ministry.as_deref().unwrap_or("-")
        );
    }
    println!("\n{} member(s)", members.len());
}

fn handle_visitor(config: &Config, cmd: VisitorCommand) -> CliResult {
    let mut dashboard = Dashboard::open(config)?;

    match cmd {
        VisitorCommand::List(args) => {
            let filter = args.filter.to_filter();
            let visitors = filter.apply(dashboard.visitors().records());
            match args.format {
                OutputFormat::Json => print_json(&visitors)?,
                OutputFormat::Table => print_visitors(&visitors),
            }
        }
        VisitorCommand::Add(args) => {
            let visitor = dashboard.visitors_mut().create(args.into_draft(today()))?;
            println!("Added visitor {} ({})", visitor.id, visitor.name);
        }
        VisitorCommand::Update(args) => {
            let (id, patch) = args.into_patch();
            let visitor = dashboard.visitors_mut().update(id, patch)?;
            println!(
                "Updated visitor {} ({}): {}",
                visitor.id, visitor.name, visitor.follow_up_status
            );
        }
        VisitorCommand::Remove(args) => {
            remove_record(dashboard.visitors_mut(), &args, |v: &Visitor| {
                format!("{} ({})", v.id, v.name)
            })?;
        }
        VisitorCommand::Stats(args) => {
            let records = dashboard.visitors().records();
            let stats = VisitorStats::compute(records, today());
            let assignees = assignee_options(records);
            if args.json {
                print_json(&serde_json::json!({
                    "stats": stats,
                    "sources": how_heard_options(records),
                    "assignees": assignees,
                }))?;
            } else {
                println!("Visitors:           {}", stats.total);
                println!("Pending:            {}", stats.pending);
                println!("In progress:        {}", stats.in_progress);
                println!("Completed:          {}", stats.completed);
                println!("Not required:       {}", stats.not_required);
                println!("Visited this month: {}", stats.visited_this_month);
                println!();
                println!("How they heard:");
                for (source, count) in &stats.by_source {
                    println!("  {source:<20} {count}");
                }
                println!("Follow-up team:     {}", assignees.join(", "));
            }
        }
        VisitorCommand::Export(args) => {
            let filter = args.filter.to_filter();
            let visitors = filter.apply(dashboard.visitors().records());
            export_records(config, args.dir, visitors)?;
        }
    }
    Ok(())
}

fn print_visitors(visitors: &[&Visitor]) {
    println!(
        "{:<4} {:<22} {:<28} {:<10} {:<13} {:<16} ASSIGNED TO",
        "ID", "NAME", "EMAIL", "VISITED", "FOLLOW-UP", "HOW HEARD"
    );
    for v in visitors {
        println!(
            "{:<4} {:<22} {:<28} {:<10} {:<13} {:<16} {}",
            v.id,
            v.name,
            v.email,
            v.visit_date,
            v.follow_up_status,
            v.how_heard,
            v.assigned_to.as_deref().unwrap_or(NOT_ASSIGNED)
        );
    }
    println!("\n{} visitor(s)", visitors.len());
}

fn handle_offering(config: &Config, cmd: OfferingCommand) -> CliResult {
    let mut dashboard = Dashboard::open(config)?;
    let currency = config.church.currency.as_str();

    match cmd {
        OfferingCommand::List(args) => {
            let filter = args.filter.to_filter();
            let offerings = filter.apply(dashboard.offerings().records());
            match args.format {
                OutputFormat::Json => print_json(&offerings)?,
                OutputFormat::Table => print_offerings(&offerings, currency),
            }
        }
        OfferingCommand::Add(args) => {
            let offering = dashboard.offerings_mut().create(args.into_draft(today()))?;
            println!(
                "Recorded offering {} for {} on {}: {}",
                offering.id,
                offering.service,
                offering.date,
                format_amount(offering.total_amount(), currency)
            );
        }
        OfferingCommand::Update(args) => {
            let (id, patch) = args.into_patch();
            let offering = dashboard.offerings_mut().update(id, patch)?;
            println!(
                "Updated offering {}: {}",
                offering.id,
                format_amount(offering.total_amount(), currency)
            );
        }
        OfferingCommand::Remove(args) => {
            remove_record(dashboard.offerings_mut(), &args, |o: &Offering| {
                format!("{} ({} on {})", o.id, o.service, o.date)
            })?;
        }
        OfferingCommand::Stats(args) => {
            let records = dashboard.offerings().records();
            let stats = OfferingStats::compute(records, today());
            let trend = offering_trend(records);
            if args.json {
                print_json(&serde_json::json!({
                    "stats": stats,
                    "trend": trend,
                    "collectors": collector_options(records),
                }))?;
            } else {
                print_offering_stats(&stats, currency);
                println!();
                println!("Trend:");
                for point in &trend {
                    println!("  {:<8} {}", point.label, format_amount(point.value, currency));
                }
            }
        }
        OfferingCommand::Export(args) => {
            let filter = args.filter.to_filter();
            let offerings = filter.apply(dashboard.offerings().records());
            export_records(config, args.dir, offerings)?;
        }
    }
    Ok(())
}

fn print_offerings(offerings: &[&Offering], currency: &str) {
    println!(
        "{:<4} {:<10} {:<24} {:>18} {:<18} COUNTED BY",
        "ID", "DATE", "SERVICE", "TOTAL", "COLLECTED BY"
    );
    for o in offerings {
        println!(
            "{:<4} {:<10} {:<24} {:>18} {:<18} {}",
            o.id,
            o.date,
            o.service,
            format_amount(o.total_amount(), currency),
            o.collected_by,
            o.counted_by
        );
    }
    println!("\n{} offering(s)", offerings.len());
}

fn print_offering_stats(stats: &OfferingStats, currency: &str) {
    let payments = &stats.payments;
    println!("Offerings:   {}", stats.count);
    println!("Total:       {}", format_amount(stats.total, currency));
    println!("Average:     {}", format_amount(stats.average, currency));
    println!("This month:  {}", format_amount(stats.this_month, currency));
    println!("Digital:     {}", format_amount(stats.digital_total, currency));
    println!();
    println!("By payment method:");
    println!(
        "  Cash       {:>18} {:>5.1}%",
        format_amount(payments.cash, currency),
        payments.cash_percent()
    );
    println!(
        "  Transfer   {:>18} {:>5.1}%",
        format_amount(payments.transfer, currency),
        payments.transfer_percent()
    );
    println!(
        "  POS        {:>18} {:>5.1}%",
        format_amount(payments.pos, currency),
        payments.pos_percent()
    );
    println!();
    println!("By service:");
    for (service, amount) in &stats.by_service {
        println!("  {:<24} {}", service, format_amount(*amount, currency));
    }
}

fn handle_checkin(config: &Config, cmd: CheckinCommand) -> CliResult {
    let mut dashboard = Dashboard::open(config)?;

    match cmd {
        CheckinCommand::Services { json } => {
            let services = dashboard.checkin().services();
            if json {
                print_json(services)?;
            } else {
                println!("{:<20} {:<28} {:<10} STATUS", "ID", "NAME", "TIME");
                for s in services {
                    println!(
                        "{:<20} {:<28} {:<10} {}",
                        s.id,
                        s.name,
                        s.time,
                        if s.active { "Active" } else { "Inactive" }
                    );
                }
            }
        }
        CheckinCommand::Add { name, time } => {
            let service = dashboard.checkin_mut().add_service(&name, &time)?;
            println!("Added check-in service {} ({})", service.id, service.name);
        }
        CheckinCommand::Toggle { id } => {
            let active = dashboard.checkin_mut().toggle(&id)?;
            println!(
                "Check-in for {id} is now {}",
                if active { "open" } else { "closed" }
            );
        }
        CheckinCommand::Url { id } => {
            let service = dashboard
                .checkin()
                .get(&id)
                .ok_or_else(|| Error::not_found("check-in service", &id))?;
            if !service.active {
                eprintln!("Note: check-in for {} is not open", service.name);
            }
            println!("{}", checkin_url(&config.checkin.base_url, &service.id, Utc::now()));
            println!("Valid for {} hour(s)", config.checkin.qr_expiration_hours);
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Church]");
                println!("  Name:               {}", config.church.name);
                println!("  Email:              {}", config.church.email);
                println!("  Phone:              {}", config.church.phone);
                println!("  Address:            {}", config.church.address);
                println!("  Website:            {}", config.church.website);
                println!("  Currency:           {}", config.church.currency);
                println!();
                println!("[Export]");
                println!("  Directory:          {}", config.export_dir().display());
                println!();
                println!("[Check-in]");
                println!("  Base URL:           {}", config.checkin.base_url);
                println!("  Link expiry (h):    {}", config.checkin.qr_expiration_hours);
                println!("  Auto refresh:       {}", config.checkin.auto_refresh);
                println!("  Require confirm:    {}", config.checkin.require_confirmation);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    eprintln!("Configuration error: {e}");
                    return Err(e.into());
                }
            }
        }
    }
    Ok(())
}
