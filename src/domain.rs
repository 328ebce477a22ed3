//! Shared domain vocabulary: slot sizes, occupancy levels, operator roles.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Size class of a slot. Labels match the floor signage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum SlotSize {
    #[serde(rename = "Pequeño")]
    #[strum(serialize = "Pequeño")]
    Pequeno,
    Mediano,
    Grande,
}

impl SlotSize {
    /// Parses a size label case-insensitively; unknown labels fall back to
    /// `Mediano`, matching the CSV import default.
    pub fn parse_or_default(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "pequeño" | "pequeno" => SlotSize::Pequeno,
            "grande" => SlotSize::Grande,
            _ => SlotSize::Mediano,
        }
    }
}

/// Discrete fill level of a slot: 0, 50 or 100 percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i32", into = "i32")]
pub enum Occupancy {
    Empty,
    Half,
    Full,
}

impl Occupancy {
    pub fn as_i32(self) -> i32 {
        match self {
            Occupancy::Empty => 0,
            Occupancy::Half => 50,
            Occupancy::Full => 100,
        }
    }

    /// Slot status string derived from the occupancy level.
    pub fn status_label(self) -> &'static str {
        match self {
            Occupancy::Empty => "empty",
            Occupancy::Half => "partial",
            Occupancy::Full => "full",
        }
    }
}

impl TryFrom<i32> for Occupancy {
    type Error = ServiceError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Occupancy::Empty),
            50 => Ok(Occupancy::Half),
            100 => Ok(Occupancy::Full),
            other => Err(ServiceError::Validation(format!(
                "quantity must be one of 0/50/100, got {other}"
            ))),
        }
    }
}

impl From<Occupancy> for i32 {
    fn from(value: Occupancy) -> Self {
        value.as_i32()
    }
}

/// Operator role, read from the profile table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Operator,
    Expedition,
    Viewer,
}
