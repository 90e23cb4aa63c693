//! Serde adapters for optional fields persisted as empty strings.
//!
//! Stored collections write `""` for an unset optional text or date field.
//! These adapters read `""`, whitespace and `null` as `None` and write `None`
//! back as `""` so saved blobs keep the same layout.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Optional text stored as `""` when unset.
pub mod text {
    use super::{Deserialize, Deserializer, Serializer};

    /// Write `None` as `""`.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    /// Read `""`, whitespace or `null` as `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|s| !s.trim().is_empty()))
    }
}

/// Optional calendar date stored as `""` when unset.
pub mod date {
    use super::{de, Deserialize, Deserializer, NaiveDate, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    /// Write `None` as `""` and dates as `YYYY-MM-DD`.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.collect_str(&date.format(FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    /// Read `""`, whitespace or `null` as `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        match value.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, FORMAT)
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}
