use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch. Clients that cannot
/// omit a timestamp send this value to mean "unset".
const ZERO_TIME_SECS: i64 = -62_135_596_800;

/// A stored mushroom sighting.
///
/// Field order is the serialization order, so the persisted file stays stable
/// between rewrites.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Sighting {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    pub count: i64,
    #[serde(rename = "dateTime")]
    pub observed_at: DateTime<Utc>,
    /// Opaque payload, usually a base64 encoded picture. Never inspected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound payload for create and update.
///
/// Every field defaults when missing so that an incomplete body is reported with
/// the specific validation message instead of a generic decode failure.
/// `created_at`/`updated_at` are not accepted from clients.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SightingInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "mushroomName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default, rename = "dateTime")]
    pub observed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SightingInput {
    /// Checks the required fields in a fixed order and reports the first failure.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.checked_observed_at().map(|_| ())
    }

    /// Runs the field checks and yields the observation time they guarantee.
    fn checked_observed_at(&self) -> Result<DateTime<Utc>, ModelError> {
        if self.location.is_empty() {
            return Err(ModelError::validation("location is required"));
        }
        if self.count < 1 {
            return Err(ModelError::validation("count must be at least 1"));
        }
        self.observed_at
            .filter(|t| !is_zero_time(t))
            .ok_or_else(|| ModelError::validation("dateTime is required"))
    }

    /// Client supplied identifier, if it is non-empty.
    pub fn requested_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Validates and turns the payload into a record with system owned fields filled in.
    pub fn into_sighting(
        self,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Sighting, ModelError> {
        let observed_at = self.checked_observed_at()?;
        Ok(Sighting {
            id,
            name: self.name.filter(|n| !n.is_empty()),
            location: self.location,
            count: self.count,
            observed_at,
            image: self.image.filter(|i| !i.is_empty()),
            created_at,
            updated_at,
        })
    }
}

fn is_zero_time(t: &DateTime<Utc>) -> bool {
    t.timestamp() == ZERO_TIME_SECS && t.timestamp_subsec_nanos() == 0
}
