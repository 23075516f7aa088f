use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use super::direction::{Direction, classify};
use super::grid::{GridCell, GridModel};
use super::name::generate_name;
use super::{PortFormState, PortType, Role};
use crate::store::{PortStore, StoreError};

/// Table that port rows are inserted into.
pub const PORTS_TABLE: &str = "ports";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please place at least one port on the grid")]
    EmptyGrid,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A submission is already in progress")]
    InFlight,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A port row as sent to the `ports` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortRecord {
    pub name: String,
    pub direction: Direction,
    /// An unset type is sent as `""`, the same as an unset name.
    #[serde(rename = "type", serialize_with = "type_or_empty")]
    pub port_type: Option<PortType>,
    pub port_count: u32,
    pub role: Role,
    pub description: String,
    pub is_passthrough: bool,
    pub input_count: u32,
    pub output_count: u32,
    /// Folded into `block_size`; the table has no column for it.
    #[serde(skip)]
    pub uses_more_blocks: bool,
    pub block_size: u32,
    pub grid_data: Vec<GridCell>,
    pub created_by: Option<String>,
    pub show_grid_colors: bool,
}

fn type_or_empty<S: serde::Serializer>(
    port_type: &Option<PortType>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(port_type.map_or("", PortType::as_str))
}

/// Validate the grid and build the record for a submission.
///
/// The name is empty when no type has been chosen yet.
pub fn assemble(
    form: &PortFormState,
    grid: &GridModel,
    created_by: Option<&str>,
) -> Result<PortRecord, ValidationError> {
    if grid.is_empty() {
        return Err(ValidationError::EmptyGrid);
    }

    if grid.is_mixed() {
        let counts = grid.counts();
        warn!(
            "Grid mixes passthrough and directional cells; {} input(s) and {} output(s) are left out of the direction code",
            counts.input, counts.output
        );
    }

    let direction = classify(grid);
    let mode = grid.mode();
    let name = generate_name(&direction, form, mode).unwrap_or_default();

    Ok(PortRecord {
        name,
        direction,
        port_type: form.port_type,
        port_count: form.port_count,
        role: form.role,
        description: form.description.clone(),
        is_passthrough: mode.is_passthrough(),
        input_count: form.input_count,
        output_count: form.output_count,
        uses_more_blocks: form.uses_more_blocks,
        block_size: form.effective_block_size(),
        grid_data: grid.snapshot(),
        created_by: created_by.map(str::to_string),
        show_grid_colors: form.show_grid_colors,
    })
}

/// Sends assembled ports to a [`PortStore`], one at a time.
///
/// While a submission is in flight, further calls to [`Submitter::submit`] fail
/// with [`SubmitError::InFlight`] and never reach the store.
pub struct Submitter<S> {
    store: S,
    in_flight: AtomicBool,
}

/// Releases the in-flight latch on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: PortStore> Submitter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate, assemble and insert one port.
    ///
    /// On success the caller is expected to reset its form and grid. On failure
    /// nothing has been written and the caller's state should be left as is.
    pub fn submit(
        &self,
        form: &PortFormState,
        grid: &GridModel,
        created_by: Option<&str>,
    ) -> Result<PortRecord, SubmitError> {
        let _guard = self.begin()?;

        let record = assemble(form, grid, created_by)?;
        debug!(
            "Submitting port '{}' ({} cell(s), direction '{}')",
            record.name,
            record.grid_data.len(),
            record.direction
        );

        self.store
            .insert_ports(PORTS_TABLE, std::slice::from_ref(&record))?;
        info!("Port '{}' stored", record.name);

        Ok(record)
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, SubmitError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SubmitError::InFlight)?;
        Ok(InFlightGuard(&self.in_flight))
    }
}
