use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::port::{
    Direction, GridModel, PlacementMode, PortFormState, classify, coerce_count, generate_name,
    parse_flag,
};

/// Default draft file, relative to the working directory.
pub const DEFAULT_DRAFT: &str = "port-draft.yaml";

/// Form fields that `port set` accepts.
pub const FIELDS: &[&str] = &[
    "type",
    "port_count",
    "role",
    "description",
    "passthrough",
    "input_count",
    "output_count",
    "uses_more_blocks",
    "block_size",
    "show_grid_colors",
];

/// A port being put together: form fields plus the placement grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDraft {
    #[serde(default)]
    pub form: PortFormState,
    #[serde(default)]
    pub grid: GridModel,
}

impl PortDraft {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!(
                    "No port draft at {}. Run `bigstone port init` to start one.",
                    path.display()
                )
            } else {
                anyhow::anyhow!("Failed to read {}: {e}", path.display())
            }
        })?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse port draft {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# BIGSTONE port draft\n{yaml}");
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn is_passthrough(&self) -> bool {
        self.grid.mode().is_passthrough()
    }

    /// Turn passthrough on or off. Turning it on clears the grid.
    pub fn set_passthrough(&mut self, on: bool) {
        let mode = if on {
            PlacementMode::Passthrough
        } else {
            PlacementMode::Directional
        };
        self.grid.set_mode(mode);
    }

    pub fn direction(&self) -> Direction {
        classify(&self.grid)
    }

    pub fn name(&self) -> Option<String> {
        generate_name(&self.direction(), &self.form, self.grid.mode())
    }

    /// Back to an empty form and grid, as after a successful submission.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set a form field from its text entry.
    ///
    /// Numeric fields fall back to 1 on bad input rather than failing.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let form = &mut self.form;
        match field {
            "type" => form.port_type = Some(value.parse()?),
            "port_count" => form.port_count = coerce_count(value),
            "role" => form.role = value.parse()?,
            "description" => form.description = value.to_string(),
            "passthrough" => {
                let on = parse_flag(value)?;
                self.set_passthrough(on);
            }
            "input_count" => form.input_count = coerce_count(value),
            "output_count" => form.output_count = coerce_count(value),
            "uses_more_blocks" => form.uses_more_blocks = parse_flag(value)?,
            "block_size" => form.block_size = coerce_count(value),
            "show_grid_colors" => form.show_grid_colors = parse_flag(value)?,
            _ => anyhow::bail!(
                "Unknown field: {field}. Valid fields: {}",
                FIELDS.join(", ")
            ),
        }
        Ok(())
    }
}
