use std::fmt;

use serde::{Serialize, Serializer};

use super::grid::GridModel;

/// Direction code derived from the contents of a grid.
///
/// `Display` produces the canonical code: `P`, `3I2O`, `3I`, `2O`, or the empty
/// string while nothing is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Undetermined,
    Passthrough,
    Inputs(usize),
    Outputs(usize),
    Mixed { inputs: usize, outputs: usize },
}

impl Direction {
    pub fn is_undetermined(self) -> bool {
        matches!(self, Self::Undetermined)
    }

    /// Label shown next to the live name preview.
    pub fn label(self) -> String {
        match self {
            Self::Undetermined => "No ports placed".to_string(),
            Self::Passthrough => "Passthrough".to_string(),
            Self::Mixed { .. } => format!("Custom ({self})"),
            Self::Inputs(n) => format!("Input ({n}×)"),
            Self::Outputs(n) => format!("Output ({n}×)"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undetermined => Ok(()),
            Self::Passthrough => f.write_str("P"),
            Self::Inputs(n) => write!(f, "{n}I"),
            Self::Outputs(n) => write!(f, "{n}O"),
            Self::Mixed { inputs, outputs } => write!(f, "{inputs}I{outputs}O"),
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Classify a grid by what has been placed on it.
///
/// Any passthrough cell makes the whole grid a passthrough, even when inputs or
/// outputs are also present. Cells without a kind are ignored.
pub fn classify(grid: &GridModel) -> Direction {
    let counts = grid.counts();

    if counts.passthrough > 0 {
        Direction::Passthrough
    } else if counts.input > 0 && counts.output > 0 {
        Direction::Mixed {
            inputs: counts.input,
            outputs: counts.output,
        }
    } else if counts.input > 0 {
        Direction::Inputs(counts.input)
    } else if counts.output > 0 {
        Direction::Outputs(counts.output)
    } else {
        Direction::Undetermined
    }
}
