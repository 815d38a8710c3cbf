//! Closed enumeration of the smart-contract frameworks we classify.
//!
//! Using a fixed enum (rather than free-form strings) means a typo in a
//! table file fails to parse instead of silently creating a new counter
//! bucket.

use serde::{Deserialize, Serialize};

/// A smart-contract authoring framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    Aiken,
    Plutarch,
    Opshin,
    PlutusTx,
    PluTs,
    Helios,
    Marlowe,
    /// Native (phase-1, non-Plutus) scripts — tallied but excluded from
    /// framework market-share percentages.
    Native,
}

impl Framework {
    /// All frameworks, in counter-array order.
    pub const ALL: [Framework; 8] = [
        Framework::Aiken,
        Framework::Plutarch,
        Framework::Opshin,
        Framework::PlutusTx,
        Framework::PluTs,
        Framework::Helios,
        Framework::Marlowe,
        Framework::Native,
    ];

    /// Number of frameworks (size of counter arrays).
    pub const COUNT: usize = Self::ALL.len();

    /// Stable index into counter arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The stable string form used in table files and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aiken => "aiken",
            Self::Plutarch => "plutarch",
            Self::Opshin => "opshin",
            Self::PlutusTx => "plutus-tx",
            Self::PluTs => "plu-ts",
            Self::Helios => "helios",
            Self::Marlowe => "marlowe",
            Self::Native => "native",
        }
    }

    /// Human-readable display name for summaries.
    pub fn title(self) -> &'static str {
        match self {
            Self::Aiken => "Aiken",
            Self::Plutarch => "Plutarch",
            Self::Opshin => "OpShin",
            Self::PlutusTx => "Plutus-tx",
            Self::PluTs => "Plu-ts",
            Self::Helios => "Helios",
            Self::Marlowe => "Marlowe",
            Self::Native => "Native",
        }
    }

    /// Logo URL used in the timeline matrix; `None` for native scripts.
    pub fn logo_url(self) -> Option<&'static str> {
        macro_rules! logo {
            ($name:literal) => {
                concat!(
                    "https://raw.githubusercontent.com/aiken-lang/site/main/public/",
                    "cardano-smart-contract-frameworks/",
                    $name,
                    ".png"
                )
            };
        }
        match self {
            Self::Aiken => Some(logo!("aiken")),
            Self::Plutarch => Some(logo!("plutarch")),
            Self::Opshin => Some(logo!("opshin")),
            Self::PlutusTx => Some(logo!("plutus-tx")),
            Self::PluTs => Some(logo!("plu-ts")),
            Self::Helios => Some(logo!("helios")),
            Self::Marlowe => Some(logo!("marlowe")),
            Self::Native => None,
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
