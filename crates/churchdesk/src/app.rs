//! The church office dashboard: every collection over one database.

use std::rc::Rc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::checkin::CheckinRegistry;
use crate::config::Config;
use crate::error::Result;
use crate::records::{Member, Offering, RecordKind, Visitor};
use crate::stats::{MemberStats, OfferingStats, VisitorStats};
use crate::storage::Storage;
use crate::store::{LoadSource, RecordStore};

/// Storage handle shared by every collection.
pub type SharedStorage = Rc<Storage>;

/// Member collection backed by the shared database.
pub type Members = RecordStore<Member, SharedStorage>;
/// Visitor collection backed by the shared database.
pub type Visitors = RecordStore<Visitor, SharedStorage>;
/// Offering collection backed by the shared database.
pub type Offerings = RecordStore<Offering, SharedStorage>;

/// The three record collections and the check-in roster.
#[derive(Debug)]
pub struct Dashboard {
    storage: SharedStorage,
    members: Members,
    visitors: Visitors,
    offerings: Offerings,
    checkin: CheckinRegistry<SharedStorage>,
}

impl Dashboard {
    /// Open the database named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or a collection
    /// cannot be loaded.
    pub fn open(config: &Config) -> Result<Self> {
        Self::with_storage(Storage::open(config.database_path())?)
    }

    /// Open a dashboard over a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_storage(Storage::open_in_memory()?)
    }

    /// Load every collection from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if a collection cannot be loaded.
    pub fn with_storage(storage: Storage) -> Result<Self> {
        let storage = Rc::new(storage);
        let dashboard = Self {
            members: RecordStore::open(Rc::clone(&storage))?,
            visitors: RecordStore::open(Rc::clone(&storage))?,
            offerings: RecordStore::open(Rc::clone(&storage))?,
            checkin: CheckinRegistry::open(Rc::clone(&storage))?,
            storage,
        };

        for (kind, source) in dashboard.sources() {
            if source == LoadSource::Recovered {
                warn!(
                    "Stored {} records were unreadable and have been reset to defaults",
                    kind
                );
            }
        }
        Ok(dashboard)
    }

    /// The underlying database.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// How each record collection was populated.
    #[must_use]
    pub fn sources(&self) -> [(RecordKind, LoadSource); 3] {
        [
            (RecordKind::Member, self.members.source()),
            (RecordKind::Visitor, self.visitors.source()),
            (RecordKind::Offering, self.offerings.source()),
        ]
    }

    /// The member directory.
    #[must_use]
    pub fn members(&self) -> &Members {
        &self.members
    }

    /// The member directory, for changes.
    pub fn members_mut(&mut self) -> &mut Members {
        &mut self.members
    }

    /// Visitors.
    #[must_use]
    pub fn visitors(&self) -> &Visitors {
        &self.visitors
    }

    /// Visitors, for changes.
    pub fn visitors_mut(&mut self) -> &mut Visitors {
        &mut self.visitors
    }

    /// Offering records.
    #[must_use]
    pub fn offerings(&self) -> &Offerings {
        &self.offerings
    }

    /// Offering records, for changes.
    pub fn offerings_mut(&mut self) -> &mut Offerings {
        &mut self.offerings
    }

    /// The check-in roster.
    #[must_use]
    pub fn checkin(&self) -> &CheckinRegistry<SharedStorage> {
        &self.checkin
    }

    /// The check-in roster, for changes.
    pub fn checkin_mut(&mut self) -> &mut CheckinRegistry<SharedStorage> {
        &mut self.checkin
    }

    /// Headline figures across all collections.
    #[must_use]
    pub fn summary(&self, today: NaiveDate) -> Summary {
        Summary {
            members: MemberStats::compute(self.members.records(), today),
            visitors: VisitorStats::compute(self.visitors.records(), today),
            offerings: OfferingStats::compute(self.offerings.records(), today),
            active_checkins: self.checkin.active().count(),
        }
    }
}

/// Headline figures for the whole dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Membership counts.
    pub members: MemberStats,
    /// Visitor follow-up counts.
    pub visitors: VisitorStats,
    /// Offering totals.
    pub offerings: OfferingStats,
    /// Services with check-in open.
    pub active_checkins: usize,
}
