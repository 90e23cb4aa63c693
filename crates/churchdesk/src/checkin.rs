//! Services open for digital check-in and the links attendees scan.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::{save_collection, KeyValueStore};
use crate::store::{load_or_seed, LoadSource};

/// Key the service roster is persisted under.
pub const CHECKIN_SERVICES_KEY: &str = "churchCheckinServices";

/// A service attendees can check in to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinService {
    /// Slug derived from the name, e.g. `sunday-morning`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Start time as entered, e.g. `10:00 AM`.
    pub time: String,
    /// Whether check-in is currently open.
    pub active: bool,
}

impl CheckinService {
    fn new(id: &str, name: &str, time: &str, active: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            time: time.to_string(),
            active,
        }
    }
}

/// The roster a fresh installation starts with.
#[must_use]
pub fn default_services() -> Vec<CheckinService> {
    vec![
        CheckinService::new("sunday-morning", "Sunday Morning Service", "10:00 AM", true),
        CheckinService::new("sunday-evening", "Sunday Evening Service", "6:00 PM", false),
        CheckinService::new("midweek", "Midweek Service", "7:00 PM", false),
        CheckinService::new("youth", "Youth Service", "5:00 PM", false),
    ]
}

/// Lower-case `name` and join its words with `-`.
#[must_use]
pub fn service_slug(name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace =
        WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));
    whitespace.replace_all(name.trim(), "-").to_lowercase()
}

/// Link an attendee opens to check in to `service_id`.
///
/// The millisecond timestamp makes every generated link distinct, so a
/// freshly generated link supersedes the previous one.
#[must_use]
pub fn checkin_url(base_url: &str, service_id: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}/checkin/{}?t={}",
        base_url.trim_end_matches('/'),
        service_id,
        at.timestamp_millis()
    )
}

/// The persisted roster of check-in services.
#[derive(Debug)]
pub struct CheckinRegistry<S> {
    store: S,
    services: Vec<CheckinService>,
    source: LoadSource,
}

impl<S: KeyValueStore> CheckinRegistry<S> {
    /// Load the roster, seeding the defaults when nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn open(store: S) -> Result<Self> {
        let (services, source) = load_or_seed(&store, CHECKIN_SERVICES_KEY, default_services)?;
        Ok(Self {
            store,
            services,
            source,
        })
    }

    /// How the roster was populated.
    #[must_use]
    pub fn source(&self) -> LoadSource {
        self.source
    }

    /// All services in insertion order.
    #[must_use]
    pub fn services(&self) -> &[CheckinService] {
        &self.services
    }

    /// Look up a service by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CheckinService> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Services with check-in open.
    pub fn active(&self) -> impl Iterator<Item = &CheckinService> {
        self.services.iter().filter(|s| s.active)
    }

    /// Add an inactive service named `name` starting at `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either field is blank or a service
    /// with the same id exists, or a storage error if the save fails.
    pub fn add_service(&mut self, name: &str, time: &str) -> Result<&CheckinService> {
        let (name, time) = (name.trim(), time.trim());
        if name.is_empty() || time.is_empty() {
            return Err(Error::validation("service name and time are required"));
        }

        let id = service_slug(name);
        if self.get(&id).is_some() {
            return Err(Error::validation(format!(
                "a service with id '{id}' already exists"
            )));
        }

        self.services.push(CheckinService::new(&id, name, time, false));
        if let Err(e) = self.save() {
            self.services.pop();
            return Err(e);
        }

        info!("Added check-in service {}", id);
        self.services
            .last()
            .ok_or_else(|| Error::internal("roster empty after insert"))
    }

    /// Open or close check-in for `id`. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, or a storage error if
    /// the save fails, in which case the state is left as it was.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let index = self
            .services
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::not_found("check-in service", id))?;

        self.services[index].active = !self.services[index].active;
        if let Err(e) = self.save() {
            self.services[index].active = !self.services[index].active;
            return Err(e);
        }

        let active = self.services[index].active;
        info!(
            "Check-in for {} {}",
            id,
            if active { "started" } else { "stopped" }
        );
        Ok(active)
    }

    fn save(&self) -> Result<()> {
        save_collection(&self.store, CHECKIN_SERVICES_KEY, &self.services)
    }
}
