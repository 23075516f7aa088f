use super::PortFormState;
use super::Role;
use super::direction::Direction;
use super::grid::PlacementMode;

/// Compose the canonical port name, e.g. `2IBIN-3-CLK-2B`.
///
/// Returns `None` until both a placement and a type exist. Segments are appended
/// in a fixed order: base and type, then port count, role and block size, each
/// only when it differs from the default.
pub fn generate_name(
    direction: &Direction,
    form: &PortFormState,
    mode: PlacementMode,
) -> Option<String> {
    if direction.is_undetermined() {
        return None;
    }
    let port_type = form.port_type?;

    let mut name = if mode.is_passthrough() {
        "P".to_string()
    } else {
        direction.to_string()
    };
    name.push_str(port_type.as_str());

    if form.port_count > 1 {
        name.push_str(&format!("-{}", form.port_count));
    }

    if form.role != Role::Sd {
        name.push_str(&format!("-{}", form.role));
    }

    if form.uses_more_blocks && form.block_size > 1 {
        name.push_str(&format!("-{}B", form.block_size));
    }

    Some(name)
}
