use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{ExtraFields, RecordRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketState {
    Open,
    Prioritizing,
    Roadmap,
    Deferred,
    InProgress,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketType {
    #[serde(rename = "BUG")]
    Bug,
    #[serde(rename = "FEATURE")]
    Feature,
    #[serde(rename = "CUSTOM_1")]
    Custom1,
    #[serde(rename = "CUSTOM_2")]
    Custom2,
    #[serde(rename = "CUSTOM_3")]
    Custom3,
    #[serde(rename = "CUSTOM_4")]
    Custom4,
    #[serde(rename = "CUSTOM_5")]
    Custom5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealPriority {
    Blocker,
    Important,
    NiceToHave,
}

impl TicketState {
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::Prioritizing,
        Self::Roadmap,
        Self::Deferred,
        Self::InProgress,
        Self::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Prioritizing => "PRIORITIZING",
            Self::Roadmap => "ROADMAP",
            Self::Deferred => "DEFERRED",
            Self::InProgress => "IN_PROGRESS",
            Self::Closed => "CLOSED",
        }
    }
}

impl TicketType {
    pub const ALL: [Self; 7] = [
        Self::Bug,
        Self::Feature,
        Self::Custom1,
        Self::Custom2,
        Self::Custom3,
        Self::Custom4,
        Self::Custom5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "BUG",
            Self::Feature => "FEATURE",
            Self::Custom1 => "CUSTOM_1",
            Self::Custom2 => "CUSTOM_2",
            Self::Custom3 => "CUSTOM_3",
            Self::Custom4 => "CUSTOM_4",
            Self::Custom5 => "CUSTOM_5",
        }
    }
}

impl DealPriority {
    pub const ALL: [Self; 3] = [Self::Blocker, Self::Important, Self::NiceToHave];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocker => "BLOCKER",
            Self::Important => "IMPORTANT",
            Self::NiceToHave => "NICE_TO_HAVE",
        }
    }
}

macro_rules! wire_enum_text {
    ($ty:ty, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::ALL.into_iter().find(|variant| variant.as_str() == value).ok_or_else(|| {
                    let expected: Vec<&str> = Self::ALL.iter().map(|variant| variant.as_str()).collect();
                    format!("unsupported {} `{value}` (expected {})", $label, expected.join("|"))
                })
            }
        }
    };
}

wire_enum_text!(TicketState, "ticket state");
wire_enum_text!(TicketType, "ticket type");
wire_enum_text!(DealPriority, "deal priority");

/// Links a ticket to a deal. `delete: true` removes an existing link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealAssociation {
    pub id: RecordRef,
    pub priority: DealPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

/// A ticket as returned by the API. `state`, `type`, `linkedDeals` and the
/// rest stay raw JSON because their value sets have changed across API
/// versions; only request payloads use the strict enums above.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}
