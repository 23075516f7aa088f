mod naming;
mod submission;

use super::grid::Coord;
use super::{GridModel, PlacementMode, PortFormState, PortType, Role, Tool};

/// Helper to create a Coord that is known to be in range.
fn at(x: i64, y: i64) -> Coord {
    Coord::new(x, y).unwrap()
}

/// Helper to build a directional grid from `(x, y, tool)` placements.
fn grid(placements: &[(i64, i64, Tool)]) -> GridModel {
    grid_in(PlacementMode::Directional, placements)
}

/// Helper to build a grid in the given mode.
fn grid_in(mode: PlacementMode, placements: &[(i64, i64, Tool)]) -> GridModel {
    let mut grid = GridModel::new(mode);
    for &(x, y, tool) in placements {
        grid.place_or_erase(at(x, y), tool);
    }
    grid
}

/// Helper to create form state with a type and otherwise default fields.
fn form(port_type: PortType) -> PortFormState {
    PortFormState {
        port_type: Some(port_type),
        ..PortFormState::default()
    }
}

/// Helper to create fully specified naming fields.
fn form_with(
    port_type: PortType,
    port_count: u32,
    role: Role,
    uses_more_blocks: bool,
    block_size: u32,
) -> PortFormState {
    PortFormState {
        port_type: Some(port_type),
        port_count,
        role,
        uses_more_blocks,
        block_size,
        ..PortFormState::default()
    }
}
