//! Remote interaction layer: the HTTP client of the SpaceX query API.

pub mod spacex_client;

pub use spacex_client::SpaceXClient;
