//! Collections exposed by the query API.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A queryable collection of the SpaceX v4 API.
///
/// A collection has two names: the endpoint segment used in
/// `POST {base}/{endpoint}/query` and the key its favorites are stored under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Collection {
    #[strum(to_string = "launches", serialize = "launch")]
    Launches,
    #[strum(
        to_string = "launch-pads",
        serialize = "launchpads",
        serialize = "launch-pad",
        serialize = "launchpad"
    )]
    LaunchPads,
}

impl Collection {
    /// Path segment of the query endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Launches => "launches",
            Self::LaunchPads => "launchpads",
        }
    }

    /// Key under which favorite ids of this collection are persisted.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Launches => "launches",
            Self::LaunchPads => "launch-pads",
        }
    }

    /// Human readable entity name, used in `NotFound` errors.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Launches => "launch",
            Self::LaunchPads => "launch pad",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_endpoint_and_storage_key_differ_for_launch_pads() {
        assert_eq!(Collection::LaunchPads.endpoint(), "launchpads");
        assert_eq!(Collection::LaunchPads.storage_key(), "launch-pads");
        assert_eq!(Collection::Launches.endpoint(), "launches");
        assert_eq!(Collection::Launches.storage_key(), "launches");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Collection::from_str("launches").unwrap(), Collection::Launches);
        assert_eq!(Collection::from_str("launchpads").unwrap(), Collection::LaunchPads);
        assert_eq!(Collection::from_str("launch-pads").unwrap(), Collection::LaunchPads);
        assert!(Collection::from_str("rockets").is_err());
    }

    #[test]
    fn test_display_uses_storage_key() {
        for collection in Collection::iter() {
            assert_eq!(collection.to_string(), collection.storage_key());
        }
    }
}
