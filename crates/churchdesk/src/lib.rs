//! `churchdesk` - Records for a church office
//!
//! This library keeps the church's member directory, visitor follow-ups and
//! offering records in a local key-value database, and provides filtering,
//! summary figures, CSV export and digital check-in links over them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod checkin;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod records;
pub mod stats;
pub mod storage;
pub mod store;

pub use app::{Dashboard, Summary};
pub use checkin::{CheckinRegistry, CheckinService};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use records::{
    FollowUpStatus, Member, MemberStatus, Offering, Record, RecordId, RecordKind, ServiceType,
    Visitor,
};
pub use storage::{KeyValueStore, Storage, StorageStats};
pub use store::{LoadSource, RecordStore};
