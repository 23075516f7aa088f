pub mod direction;
pub mod grid;
pub mod name;
pub mod submit;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use direction::{Direction, classify};
pub use grid::{GridModel, PlacementMode, Tool};
pub use name::generate_name;
pub use submit::{PortRecord, Submitter};

/// Error raised when a form value does not name a known option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid port type: {0}. Must be one of BIN, HEX, ITEM, FLY.")]
    PortType(String),

    #[error("Invalid role: {0}. Must be one of SD, STATE, CLK, RST, WATER, HOPPER.")]
    Role(String),

    #[error("Invalid tool: {0}. Must be input, output, passthrough or erase.")]
    Tool(String),

    #[error("Invalid boolean: {0}. Use true/false, yes/no, on/off or 1/0.")]
    Flag(String),
}

/// Signal encoding carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortType {
    Bin,
    Hex,
    Item,
    Fly,
}

impl PortType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bin => "BIN",
            Self::Hex => "HEX",
            Self::Item => "ITEM",
            Self::Fly => "FLY",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Bin => "Binary (BIN)",
            Self::Hex => "Hexadecimal (HEX)",
            Self::Item => "Item",
            Self::Fly => "Fly (FLY)",
        }
    }

    pub fn all() -> &'static [PortType] {
        &[PortType::Bin, PortType::Hex, PortType::Item, PortType::Fly]
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PortType::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::PortType(s.to_string()))
    }
}

/// What the port is used for. `Sd` (standard) is the default and is left out of names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Sd,
    State,
    Clk,
    Rst,
    Water,
    Hopper,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sd => "SD",
            Self::State => "STATE",
            Self::Clk => "CLK",
            Self::Rst => "RST",
            Self::Water => "WATER",
            Self::Hopper => "HOPPER",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sd => "Standard (SD)",
            Self::State => "State",
            Self::Clk => "Clock",
            Self::Rst => "Reset",
            Self::Water => "Water stream",
            Self::Hopper => "Hopper",
        }
    }

    pub fn all() -> &'static [Role] {
        &[
            Role::Sd,
            Role::State,
            Role::Clk,
            Role::Rst,
            Role::Water,
            Role::Hopper,
        ]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::all()
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::Role(s.to_string()))
    }
}

/// Configuration fields that drive naming and end up in the persisted record.
///
/// The passthrough flag is not stored here: it is the [`PlacementMode`] owned by
/// the grid, so switching it and clearing the grid happen in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortFormState {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub port_type: Option<PortType>,
    pub port_count: u32,
    pub role: Role,
    pub description: String,
    pub input_count: u32,
    pub output_count: u32,
    pub uses_more_blocks: bool,
    pub block_size: u32,
    pub show_grid_colors: bool,
}

impl Default for PortFormState {
    fn default() -> Self {
        Self {
            port_type: None,
            port_count: 1,
            role: Role::Sd,
            description: String::new(),
            input_count: 1,
            output_count: 1,
            uses_more_blocks: false,
            block_size: 1,
            show_grid_colors: true,
        }
    }
}

impl PortFormState {
    /// Block size as it is persisted: 1 unless the port uses more blocks.
    pub fn effective_block_size(&self) -> u32 {
        if self.uses_more_blocks {
            self.block_size
        } else {
            1
        }
    }
}

/// Parse a numeric form entry, falling back to 1.
///
/// Non-numeric, zero and negative entries all become 1; decimals are truncated.
pub fn coerce_count(input: &str) -> u32 {
    let trimmed = input.trim();
    let parsed = trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    });

    match parsed {
        Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Parse a checkbox-style form entry.
pub fn parse_flag(input: &str) -> Result<bool, ParseError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ParseError::Flag(input.to_string())),
    }
}
