use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ParseError;

/// Width and height of the placement grid.
pub const GRID_SIZE: u8 = 16;

/// Colour stamped on new cells until another brush is chosen.
pub const DEFAULT_COLOR: &str = "#ef4444";

/// Named colours offered for the brush.
pub const PALETTE: [(&str, &str); 3] = [
    ("red", "#ef4444"),
    ("blue", "#3b82f6"),
    ("green", "#10b981"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Coordinate ({x},{y}) is outside the 16x16 grid")]
    OutOfBounds { x: i64, y: i64 },

    #[error("Invalid cell: {0}. Expected x,y or x,y=tool (e.g. 3,4=input)")]
    InvalidCell(String),
}

/// A 1-indexed coordinate on the placement grid.
///
/// Only constructible inside `[1, 16] x [1, 16]`. Ordered row first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    x: u8,
    y: u8,
}

impl Coord {
    pub fn new(x: i64, y: i64) -> Result<Self, GridError> {
        let in_range = |v: i64| (1..=i64::from(GRID_SIZE)).contains(&v);
        if in_range(x) && in_range(y) {
            Ok(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            Err(GridError::OutOfBounds { x, y })
        }
    }

    pub fn x(self) -> u8 {
        self.x
    }

    pub fn y(self) -> u8 {
        self.y
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Classification of an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Input,
    Output,
    Passthrough,
}

impl CellKind {
    /// Single-character glyph used when listing cells.
    pub fn glyph(self) -> char {
        match self {
            Self::Input => '↑',
            Self::Output => '↓',
            Self::Passthrough => 'P',
        }
    }
}

/// Tool applied by a click on the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Input,
    Output,
    Passthrough,
    Erase,
}

impl Tool {
    fn kind(self) -> Option<CellKind> {
        match self {
            Self::Input => Some(CellKind::Input),
            Self::Output => Some(CellKind::Output),
            Self::Passthrough => Some(CellKind::Passthrough),
            Self::Erase => None,
        }
    }
}

impl FromStr for Tool {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" | "in" | "i" => Ok(Self::Input),
            "output" | "out" | "o" => Ok(Self::Output),
            "passthrough" | "p" => Ok(Self::Passthrough),
            "erase" | "x" => Ok(Self::Erase),
            _ => Err(ParseError::Tool(s.to_string())),
        }
    }
}

/// Whether cells are placed as inputs/outputs or as passthroughs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    #[default]
    Directional,
    Passthrough,
}

impl PlacementMode {
    pub fn is_passthrough(self) -> bool {
        matches!(self, Self::Passthrough)
    }
}

/// One occupied coordinate, in the shape stored in the `grid_data` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub x: u8,
    pub y: u8,
    #[serde(rename = "type")]
    pub kind: Option<CellKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_variation: Option<String>,
}

/// Per-kind cell counts. Cells with no kind are tallied separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub input: usize,
    pub output: usize,
    pub passthrough: usize,
    pub unset: usize,
}

/// Sparse 16x16 placement grid with at most one cell per coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridSnapshot", into = "GridSnapshot")]
pub struct GridModel {
    mode: PlacementMode,
    brush: Option<String>,
    cells: BTreeMap<Coord, GridCell>,
}

impl Default for GridModel {
    fn default() -> Self {
        Self::new(PlacementMode::Directional)
    }
}

impl GridModel {
    pub fn new(mode: PlacementMode) -> Self {
        Self {
            mode,
            brush: Some(DEFAULT_COLOR.to_string()),
            cells: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// Switch placement mode. Entering passthrough mode empties the grid, so a
    /// passthrough grid never holds cells placed as inputs or outputs.
    pub fn set_mode(&mut self, mode: PlacementMode) {
        if mode.is_passthrough() {
            self.clear();
        }
        self.mode = mode;
    }

    pub fn brush(&self) -> Option<&str> {
        self.brush.as_deref()
    }

    pub fn set_brush(&mut self, color: Option<String>) {
        self.brush = color;
    }

    /// Apply `tool` at `coord`, returning the cell that was there before.
    ///
    /// Any tool other than erase writes a fresh cell (annotations are not
    /// carried over). In passthrough mode the cell is always a passthrough.
    pub fn place_or_erase(&mut self, coord: Coord, tool: Tool) -> Option<GridCell> {
        let Some(kind) = tool.kind() else {
            return self.cells.remove(&coord);
        };
        let kind = if self.mode.is_passthrough() {
            CellKind::Passthrough
        } else {
            kind
        };
        let cell = GridCell {
            x: coord.x(),
            y: coord.y(),
            kind: Some(kind),
            color: self.brush.clone(),
            block_name: None,
            block_variation: None,
        };
        self.cells.insert(coord, cell)
    }

    /// Set the block annotation of an existing cell. Returns false, changing
    /// nothing, if the coordinate is empty.
    pub fn annotate(
        &mut self,
        coord: Coord,
        block_name: impl Into<String>,
        block_variation: impl Into<String>,
    ) -> bool {
        match self.cells.get_mut(&coord) {
            Some(cell) => {
                cell.block_name = Some(block_name.into());
                cell.block_variation = Some(block_variation.into());
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn query(&self, coord: Coord) -> Option<&GridCell> {
        self.cells.get(&coord)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells ordered by row, then column.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.values()
    }

    pub fn counts(&self) -> CellCounts {
        self.cells
            .values()
            .fold(CellCounts::default(), |mut counts, cell| {
                match cell.kind {
                    Some(CellKind::Input) => counts.input += 1,
                    Some(CellKind::Output) => counts.output += 1,
                    Some(CellKind::Passthrough) => counts.passthrough += 1,
                    None => counts.unset += 1,
                }
                counts
            })
    }

    /// True when passthrough cells sit alongside inputs or outputs.
    pub fn is_mixed(&self) -> bool {
        let counts = self.counts();
        counts.passthrough > 0 && (counts.input > 0 || counts.output > 0)
    }

    /// Owned copy of every cell, for persisting.
    pub fn snapshot(&self) -> Vec<GridCell> {
        self.cells.values().cloned().collect()
    }
}

static CELL_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\(?\s*(-?\d+)\s*,\s*(-?\d+)\s*\)?\s*(?:=\s*([A-Za-z]+)\s*)?$")
        .expect("cell spec pattern is valid")
});

/// Parse a cell argument such as `3,4`, `(3,4)` or `3,4=output`.
///
/// The tool is `None` when the argument names only a coordinate.
pub fn parse_cell_spec(spec: &str) -> Result<(Coord, Option<Tool>), GridError> {
    let caps = CELL_SPEC
        .captures(spec)
        .ok_or_else(|| GridError::InvalidCell(spec.to_string()))?;

    let number = |i: usize| {
        caps[i]
            .parse::<i64>()
            .map_err(|_| GridError::InvalidCell(spec.to_string()))
    };
    let coord = Coord::new(number(1)?, number(2)?)?;

    let tool = match caps.get(3) {
        Some(m) => Some(
            m.as_str()
                .parse::<Tool>()
                .map_err(|_| GridError::InvalidCell(spec.to_string()))?,
        ),
        None => None,
    };
    Ok((coord, tool))
}

/// On-disk form of a [`GridModel`].
#[derive(Serialize, Deserialize)]
struct GridSnapshot {
    #[serde(default)]
    mode: PlacementMode,
    #[serde(default = "default_brush")]
    brush: Option<String>,
    #[serde(default)]
    cells: Vec<GridCell>,
}

fn default_brush() -> Option<String> {
    Some(DEFAULT_COLOR.to_string())
}

impl TryFrom<GridSnapshot> for GridModel {
    type Error = GridError;

    fn try_from(snapshot: GridSnapshot) -> Result<Self, Self::Error> {
        let mut cells = BTreeMap::new();
        // Later entries win, as with repeated placement.
        for cell in snapshot.cells {
            let coord = Coord::new(i64::from(cell.x), i64::from(cell.y))?;
            cells.insert(coord, cell);
        }
        Ok(Self {
            mode: snapshot.mode,
            brush: snapshot.brush,
            cells,
        })
    }
}

impl From<GridModel> for GridSnapshot {
    fn from(grid: GridModel) -> Self {
        Self {
            mode: grid.mode,
            brush: grid.brush,
            cells: grid.cells.into_values().collect(),
        }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyph = self.kind.map(CellKind::glyph).unwrap_or('·');
        write!(f, "({},{}) {glyph}", self.x, self.y)?;
        if let Some(name) = self.block_name.as_deref().filter(|n| !n.is_empty()) {
            write!(f, " {name}")?;
            if let Some(variation) = self.block_variation.as_deref().filter(|v| !v.is_empty()) {
                write!(f, " ({variation})")?;
            }
        }
        Ok(())
    }
}
