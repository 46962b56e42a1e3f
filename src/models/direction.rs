//! Sync directions and budget flag colors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two one-way sync flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Shared-expense ledger into the personal budget
    LedgerToBudget,
    /// Flagged budget transactions into the shared-expense ledger
    BudgetToLedger,
}

impl Direction {
    /// Both directions, in the order a run executes them
    pub const ALL: [Direction; 2] = [Direction::LedgerToBudget, Direction::BudgetToLedger];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LedgerToBudget => write!(f, "ledger->budget"),
            Self::BudgetToLedger => write!(f, "budget->ledger"),
        }
    }
}

/// Flag colors offered by the budget service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlagColor {
    #[default]
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl FlagColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
        }
    }
}

impl fmt::Display for FlagColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "orange" => Ok(Self::Orange),
            "yellow" => Ok(Self::Yellow),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "purple" => Ok(Self::Purple),
            other => Err(format!(
                "unknown flag color '{}' (expected red, orange, yellow, green, blue or purple)",
                other
            )),
        }
    }
}
