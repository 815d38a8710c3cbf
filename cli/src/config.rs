//! Run configuration, read from the environment.

use std::env;
use std::path::PathBuf;

use chaincensus_core::{CensusError, Point};

/// Default node endpoint when `OGMIOS_HOST` is unset.
const DEFAULT_HOST: &str = "ws://127.0.0.1:1337";

/// Per-network census starting points: the last block before any framework
/// output could exist on that network.
const STARTING_POINTS: [(&str, u64, &str); 3] = [
    (
        "mainnet",
        89_856_876,
        "f51440b362ace1e72977c4d4f758635b55aaccc212fb3110977c59a3ef7c0055",
    ),
    (
        "preprod",
        25_426_067,
        "d2a3c9960caa23411e930e9dc8948b6192c57e0015ba8498a271b41f12c5711d",
    ),
    (
        "preview",
        14_691_585,
        "cb30efdbae18c9cccfbf453821b7724b5a1ab9dd0c86154782217a65555e2517",
    ),
];

/// Everything a run needs, resolved before any network traffic.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub network: String,
    pub host: String,
    pub since: Point,
    pub until: Option<Point>,
    pub data_dir: PathBuf,
}

impl RunConfig {
    /// Resolve configuration from `NETWORK`, `OGMIOS_HOST`, `UNTIL_SLOT`,
    /// `UNTIL_ID`, and `DATA_DIR`.
    pub fn from_env() -> Result<Self, CensusError> {
        let network = env::var("NETWORK").unwrap_or_else(|_| "mainnet".into());
        let since = starting_point(&network)
            .ok_or_else(|| CensusError::UnknownNetwork(network.clone()))?;

        let host = env::var("OGMIOS_HOST").unwrap_or_else(|_| DEFAULT_HOST.into());
        let data_dir = env::var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| "./data".into());

        let until = match (env::var("UNTIL_SLOT").ok(), env::var("UNTIL_ID").ok()) {
            (Some(slot), Some(id)) => {
                let slot: u64 = slot.parse().map_err(|_| {
                    CensusError::Config(format!("UNTIL_SLOT is not a slot number: {slot}"))
                })?;
                Some(Point::new(slot, id))
            }
            (None, None) => None,
            _ => {
                return Err(CensusError::Config(
                    "UNTIL_SLOT and UNTIL_ID must be set together".into(),
                ));
            }
        };

        Ok(Self { network, host, since, until, data_dir })
    }

    /// The slot the run window ends at, once the node's tip is known.
    pub fn boundary_slot(&self, tip_slot: u64) -> u64 {
        self.until.as_ref().map(|p| p.slot).unwrap_or(tip_slot)
    }
}

/// The census starting point for a network, if it is one we know.
pub fn starting_point(network: &str) -> Option<Point> {
    STARTING_POINTS
        .iter()
        .find(|(name, _, _)| *name == network)
        .map(|(_, slot, id)| Point::new(*slot, *id))
}
