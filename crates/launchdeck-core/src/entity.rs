//! Entity models returned by the query API.
//!
//! Entities are immutable once fetched; identity is the `id` field. Fields the
//! API may omit (or that a narrow `select` drops) default instead of failing
//! the whole page.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::collection::Collection;

/// Anything with an id and a display name, populated references included.
pub trait Named {
    /// Stable identifier of the record.
    fn id(&self) -> &str;

    /// Name shown in listings.
    fn display_name(&self) -> &str;
}

/// A record that can be queried, searched and favorited.
pub trait Entity: Named + DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Collection this entity type is served from.
    const COLLECTION: Collection;

    /// Projected string fields matched by the incremental search.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

/// A reference to another record: either the bare id or, when the query asked
/// to `populate` the path, the embedded record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    Populated(Box<T>),
}

impl<T> Reference<T> {
    /// Returns the embedded record when the reference was populated.
    pub fn populated(&self) -> Option<&T> {
        match self {
            Self::Id(_) => None,
            Self::Populated(record) => Some(record),
        }
    }
}

impl<T: Named> Reference<T> {
    /// Id of the referenced record, populated or not.
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populated(record) => record.id(),
        }
    }

    /// Name of the referenced record; `None` unless populated.
    pub fn name(&self) -> Option<&str> {
        self.populated().map(|record| record.display_name())
    }
}

// Launch

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flight_number: Option<u32>,
    #[serde(default)]
    pub date_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_local: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub upcoming: bool,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub rocket: Option<Reference<Rocket>>,
    #[serde(default)]
    pub launchpad: Option<Reference<LaunchPad>>,
    #[serde(default)]
    pub links: LaunchLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchLinks {
    #[serde(default)]
    pub patch: PatchLinks,
    #[serde(default)]
    pub flickr: FlickrLinks,
    #[serde(default)]
    pub webcast: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchLinks {
    pub small: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlickrLinks {
    #[serde(default)]
    pub small: Vec<String>,
    #[serde(default)]
    pub original: Vec<String>,
}

impl Launch {
    /// Cover image: the first original flickr photo, falling back to the
    /// small mission patch.
    pub fn image_url(&self) -> Option<&str> {
        self.links
            .flickr
            .original
            .first()
            .or(self.links.patch.small.as_ref())
            .map(String::as_str)
    }

    pub fn rocket_name(&self) -> Option<&str> {
        self.rocket.as_ref().and_then(Reference::name)
    }

    /// Short name of the populated launch pad (not its `full_name`).
    pub fn launchpad_name(&self) -> Option<&str> {
        self.launchpad
            .as_ref()
            .and_then(Reference::populated)
            .map(|pad| pad.name.as_str())
    }
}

impl Named for Launch {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Entity for Launch {
    const COLLECTION: Collection = Collection::Launches;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.name.as_str())];
        fields.extend(self.rocket_name().map(Cow::Borrowed));
        fields.extend(self.launchpad_name().map(Cow::Borrowed));
        fields
    }
}

// LaunchPad

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchPad {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub status: LaunchPadStatus,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub launch_attempts: u32,
    #[serde(default)]
    pub launch_successes: u32,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub rockets: Vec<Reference<Rocket>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchPadStatus {
    Active,
    Inactive,
    Retired,
    Lost,
    #[serde(rename = "under construction")]
    UnderConstruction,
    #[default]
    #[serde(other)]
    Unknown,
}

impl LaunchPad {
    /// Names of the populated rockets, comma separated.
    pub fn rocket_names(&self) -> String {
        self.rockets
            .iter()
            .filter_map(Reference::name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_active(&self) -> bool {
        self.status == LaunchPadStatus::Active
    }
}

impl Named for LaunchPad {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.name
        } else {
            &self.full_name
        }
    }
}

impl Entity for LaunchPad {
    const COLLECTION: Collection = Collection::LaunchPads;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.full_name.as_str()),
            Cow::Owned(self.rocket_names()),
        ]
    }
}

// Rocket (only ever seen populated)

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rocket {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub success_rate_pct: Option<f64>,
    #[serde(default)]
    pub height: Length,
    #[serde(default)]
    pub mass: Mass,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub meters: Option<f64>,
    pub feet: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mass {
    pub kg: Option<f64>,
    pub lb: Option<f64>,
}

impl Named for Rocket {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_launch_with_populated_references() {
        let launch: Launch = serde_json::from_value(json!({
            "id": "5eb87cd9ffd86e000604b32a",
            "name": "FalconSat",
            "flight_number": 1,
            "date_utc": "2006-03-24T22:30:00.000Z",
            "date_local": "2006-03-25T10:30:00+12:00",
            "success": false,
            "upcoming": false,
            "rocket": { "id": "5e9d0d95eda69955f709d1eb", "name": "Falcon 1" },
            "launchpad": { "id": "5e9e4502f5090995de566f86", "name": "Kwajalein Atoll" },
            "links": {
                "patch": { "small": "https://images2.imgbox.com/small.png", "large": null },
                "flickr": { "small": [], "original": [] }
            }
        }))
        .unwrap();

        assert_eq!(launch.rocket_name(), Some("Falcon 1"));
        assert_eq!(launch.launchpad_name(), Some("Kwajalein Atoll"));
        assert_eq!(launch.image_url(), Some("https://images2.imgbox.com/small.png"));
        assert_eq!(
            launch.search_fields(),
            vec!["FalconSat", "Falcon 1", "Kwajalein Atoll"]
        );
    }

    #[test]
    fn test_launch_with_bare_references() {
        let launch: Launch = serde_json::from_value(json!({
            "id": "abc",
            "name": "Starlink-1",
            "rocket": "5e9d0d95eda69973a809d1ec",
            "launchpad": "5e9e4501f509094ba4566f84"
        }))
        .unwrap();

        assert_eq!(
            launch.rocket.as_ref().map(Reference::id),
            Some("5e9d0d95eda69973a809d1ec")
        );
        assert_eq!(launch.rocket_name(), None);
        assert_eq!(launch.search_fields(), vec!["Starlink-1"]);
    }

    #[test]
    fn test_launch_pad_rocket_names_and_status() {
        let pad: LaunchPad = serde_json::from_value(json!({
            "id": "pad-1",
            "name": "KSC LC 39A",
            "full_name": "Kennedy Space Center Historic Launch Complex 39A",
            "status": "active",
            "launch_attempts": 55,
            "launch_successes": 55,
            "rockets": [
                { "id": "r1", "name": "Falcon 9" },
                { "id": "r2", "name": "Falcon Heavy" }
            ]
        }))
        .unwrap();

        assert!(pad.is_active());
        assert_eq!(pad.rocket_names(), "Falcon 9, Falcon Heavy");
        assert_eq!(
            pad.search_fields(),
            vec![
                "Kennedy Space Center Historic Launch Complex 39A",
                "Falcon 9, Falcon Heavy"
            ]
        );
    }

    #[test]
    fn test_unknown_launch_pad_status() {
        let pad: LaunchPad =
            serde_json::from_value(json!({ "id": "p", "status": "decommissioned" })).unwrap();
        assert_eq!(pad.status, LaunchPadStatus::Unknown);

        let pad: LaunchPad =
            serde_json::from_value(json!({ "id": "p", "status": "under construction" })).unwrap();
        assert_eq!(pad.status, LaunchPadStatus::UnderConstruction);
    }
}
