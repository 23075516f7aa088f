use super::*;
use crate::port::{Direction, classify, generate_name};

#[test]
fn two_inputs_one_output_bin() {
    let g = grid(&[(1, 1, Tool::Input), (2, 1, Tool::Input), (3, 1, Tool::Output)]);
    let direction = classify(&g);
    assert_eq!(direction.to_string(), "2I1O");
    assert_eq!(
        generate_name(&direction, &form(PortType::Bin), g.mode()).as_deref(),
        Some("2I1OBIN")
    );
}

#[test]
fn passthrough_item() {
    let g = grid_in(PlacementMode::Passthrough, &[(5, 5, Tool::Passthrough)]);
    let direction = classify(&g);
    assert_eq!(direction.to_string(), "P");
    assert_eq!(
        generate_name(&direction, &form(PortType::Item), g.mode()).as_deref(),
        Some("PITEM")
    );
}

#[test]
fn all_segments() {
    let state = form_with(PortType::Hex, 3, Role::Clk, true, 2);
    assert_eq!(
        generate_name(&Direction::Inputs(1), &state, PlacementMode::Directional).as_deref(),
        Some("1IHEX-3-CLK-2B")
    );
}

#[test]
fn segments_in_fixed_order() {
    let state = form_with(PortType::Bin, 3, Role::Clk, true, 2);
    assert_eq!(
        generate_name(&Direction::Inputs(2), &state, PlacementMode::Directional).as_deref(),
        Some("2IBIN-3-CLK-2B")
    );
}

#[test]
fn unset_type_has_no_name() {
    let state = PortFormState::default();
    assert_eq!(
        generate_name(&Direction::Inputs(4), &state, PlacementMode::Directional),
        None
    );
}

#[test]
fn undetermined_direction_has_no_name() {
    assert_eq!(
        generate_name(
            &Direction::Undetermined,
            &form(PortType::Fly),
            PlacementMode::Directional
        ),
        None
    );
}

#[test]
fn single_port_is_omitted() {
    let state = form_with(PortType::Fly, 1, Role::Sd, false, 1);
    assert_eq!(
        generate_name(&Direction::Outputs(2), &state, PlacementMode::Directional).as_deref(),
        Some("2OFLY")
    );
}

#[test]
fn block_size_needs_more_blocks_flag() {
    let state = form_with(PortType::Bin, 1, Role::Sd, false, 4);
    assert_eq!(
        generate_name(&Direction::Inputs(1), &state, PlacementMode::Directional).as_deref(),
        Some("1IBIN")
    );

    let state = form_with(PortType::Bin, 1, Role::Sd, true, 1);
    assert_eq!(
        generate_name(&Direction::Inputs(1), &state, PlacementMode::Directional).as_deref(),
        Some("1IBIN")
    );
}

#[test]
fn every_non_standard_role_is_appended() {
    for role in Role::all().iter().copied().filter(|r| *r != Role::Sd) {
        let state = form_with(PortType::Item, 1, role, false, 1);
        let name =
            generate_name(&Direction::Outputs(1), &state, PlacementMode::Directional).unwrap();
        assert_eq!(name, format!("1OITEM-{}", role.as_str()));
    }
}

#[test]
fn passthrough_mode_uses_p_base() {
    let state = form_with(PortType::Hex, 2, Role::Water, false, 1);
    assert_eq!(
        generate_name(&Direction::Passthrough, &state, PlacementMode::Passthrough).as_deref(),
        Some("PHEX-2-WATER")
    );
}
