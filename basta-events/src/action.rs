use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The webhook action types we know how to translate.
///
/// BASTA suffixes its current webhook revision with `V2`; the unsuffixed
/// names are still sent by older sale configurations and map to the same
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    BidOnItem,
    ItemStatusChanged,
    SaleStatusChanged,
    SaleUpdated,
    ItemUpdated,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown action type: {0}")]
pub struct UnknownActionType(pub String);

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::BidOnItem,
        ActionType::ItemStatusChanged,
        ActionType::SaleStatusChanged,
        ActionType::SaleUpdated,
        ActionType::ItemUpdated,
    ];

    /// Current wire name of the action type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::BidOnItem => "BidOnItemV2",
            ActionType::ItemStatusChanged => "ItemStatusChangedV2",
            ActionType::SaleStatusChanged => "SaleStatusChangedV2",
            ActionType::SaleUpdated => "SaleUpdatedV2",
            ActionType::ItemUpdated => "ItemUpdatedV2",
        }
    }
}

impl FromStr for ActionType {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BidOnItemV2" | "BidOnItem" => Ok(ActionType::BidOnItem),
            "ItemStatusChangedV2" | "ItemStatusChanged" => Ok(ActionType::ItemStatusChanged),
            "SaleStatusChangedV2" | "SaleStatusChanged" => Ok(ActionType::SaleStatusChanged),
            "SaleUpdatedV2" | "SaleUpdated" => Ok(ActionType::SaleUpdated),
            "ItemUpdatedV2" | "ItemUpdated" => Ok(ActionType::ItemUpdated),
            other => Err(UnknownActionType(other.to_owned())),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
