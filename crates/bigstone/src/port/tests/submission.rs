use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;

use super::*;
use crate::port::submit::{PORTS_TABLE, SubmitError, ValidationError, assemble};
use crate::port::{Direction, PortRecord, Submitter};
use crate::store::{PortStore, StoreError};

/// In-memory store that records every insert, or rejects with a fixed message.
#[derive(Default)]
struct RecordingStore {
    inserted: Mutex<Vec<(String, PortRecord)>>,
    reject_with: Option<String>,
}

impl RecordingStore {
    fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn count(&self) -> usize {
        self.inserted.lock().unwrap().len()
    }
}

impl PortStore for RecordingStore {
    fn insert_ports(&self, table: &str, records: &[PortRecord]) -> Result<(), StoreError> {
        if let Some(message) = &self.reject_with {
            return Err(StoreError::Rejected(message.clone()));
        }
        let mut inserted = self.inserted.lock().unwrap();
        for record in records {
            inserted.push((table.to_string(), record.clone()));
        }
        Ok(())
    }
}

/// Store that parks inside `insert_ports` until released.
struct BlockingStore {
    entered: mpsc::Sender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl PortStore for BlockingStore {
    fn insert_ports(&self, _table: &str, _records: &[PortRecord]) -> Result<(), StoreError> {
        self.entered.send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Ok(())
    }
}

#[test]
fn empty_grid_fails_validation() {
    let result = assemble(&form(PortType::Bin), &GridModel::default(), None);
    assert_eq!(result, Err(ValidationError::EmptyGrid));
}

#[test]
fn empty_grid_never_reaches_store() {
    let store = RecordingStore::default();
    let submitter = Submitter::new(&store);

    let err = submitter
        .submit(&form(PortType::Bin), &GridModel::default(), None)
        .unwrap_err();

    assert!(matches!(err, SubmitError::Validation(ValidationError::EmptyGrid)));
    assert_eq!(err.to_string(), "Please place at least one port on the grid");
    assert_eq!(store.count(), 0);
    assert!(!submitter.is_submitting());
}

#[test]
fn record_carries_derived_and_form_fields() {
    let g = grid(&[(1, 1, Tool::Input), (2, 1, Tool::Input), (3, 1, Tool::Output)]);
    let mut state = form_with(PortType::Bin, 3, Role::Clk, true, 2);
    state.description = "Clocked bus".to_string();
    state.input_count = 2;
    state.output_count = 1;

    let record = assemble(&state, &g, Some("user-1")).unwrap();

    assert_eq!(record.name, "2I1OBIN-3-CLK-2B");
    assert_eq!(record.direction, Direction::Mixed { inputs: 2, outputs: 1 });
    assert_eq!(record.port_type, Some(PortType::Bin));
    assert_eq!(record.port_count, 3);
    assert_eq!(record.role, Role::Clk);
    assert_eq!(record.description, "Clocked bus");
    assert!(!record.is_passthrough);
    assert_eq!((record.input_count, record.output_count), (2, 1));
    assert!(record.uses_more_blocks);
    assert_eq!(record.block_size, 2);
    assert_eq!(record.grid_data, g.snapshot());
    assert_eq!(record.created_by.as_deref(), Some("user-1"));
}

#[test]
fn block_size_normalized_without_more_blocks() {
    let g = grid(&[(1, 1, Tool::Input)]);
    let state = form_with(PortType::Hex, 1, Role::Sd, false, 7);
    let record = assemble(&state, &g, None).unwrap();
    assert_eq!(record.block_size, 1);
    assert_eq!(record.name, "1IHEX");
}

#[test]
fn unset_type_submits_empty_name() {
    let g = grid(&[(1, 1, Tool::Output)]);
    let record = assemble(&PortFormState::default(), &g, None).unwrap();
    assert_eq!(record.name, "");
    assert_eq!(record.direction.to_string(), "1O");
}

#[test]
fn passthrough_record() {
    let g = grid_in(PlacementMode::Passthrough, &[(5, 5, Tool::Passthrough)]);
    let record = assemble(&form(PortType::Item), &g, None).unwrap();
    assert!(record.is_passthrough);
    assert_eq!(record.name, "PITEM");
    assert_eq!(record.direction, Direction::Passthrough);
}

#[test]
fn mixed_grid_keeps_directional_cells_in_snapshot() {
    let g = grid(&[(1, 1, Tool::Input), (2, 1, Tool::Passthrough)]);
    let record = assemble(&form(PortType::Bin), &g, None).unwrap();
    assert_eq!(record.direction, Direction::Passthrough);
    assert_eq!(record.grid_data.len(), 2);
    // Mode is directional, so the base is the direction code rather than the flag.
    assert_eq!(record.name, "PBIN");
}

#[test]
fn record_json_uses_table_columns() {
    let g = grid(&[(1, 1, Tool::Input)]);
    let record = assemble(&form(PortType::Fly), &g, None).unwrap();
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["name"], "1IFLY");
    assert_eq!(json["direction"], "1I");
    assert_eq!(json["type"], "FLY");
    assert_eq!(json["port_count"], 1);
    assert_eq!(json["role"], "SD");
    assert_eq!(json["is_passthrough"], false);
    assert_eq!(json["block_size"], 1);
    assert_eq!(json["grid_data"][0]["type"], "input");
    assert_eq!(json["created_by"], serde_json::Value::Null);
    assert_eq!(json["show_grid_colors"], true);
    assert!(json.get("uses_more_blocks").is_none());
}

#[test]
fn untyped_record_sends_empty_strings() {
    let g = grid(&[(1, 1, Tool::Input)]);
    let record = assemble(&PortFormState::default(), &g, None).unwrap();
    assert_eq!(record.port_type, None);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["name"], "");
    assert_eq!(json["type"], "");
    assert_eq!(json["direction"], "1I");
}

#[test]
fn successful_submit_inserts_one_row() {
    let store = RecordingStore::default();
    let submitter = Submitter::new(&store);
    let g = grid(&[(1, 1, Tool::Input)]);

    let record = submitter
        .submit(&form(PortType::Bin), &g, Some("user-1"))
        .unwrap();

    let inserted = store.inserted.lock().unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].0, PORTS_TABLE);
    assert_eq!(inserted[0].1, record);
    assert!(!submitter.is_submitting());
}

#[test]
fn store_rejection_is_surfaced_verbatim() {
    let store = RecordingStore::rejecting("new row violates row-level security policy");
    let submitter = Submitter::new(&store);
    let g = grid(&[(1, 1, Tool::Input)]);

    let err = submitter.submit(&form(PortType::Bin), &g, None).unwrap_err();

    assert!(matches!(err, SubmitError::Store(StoreError::Rejected(_))));
    assert_eq!(err.to_string(), "new row violates row-level security policy");
    assert!(!submitter.is_submitting());

    // The latch is released, so a corrected attempt can go through.
    let err = submitter.submit(&form(PortType::Bin), &g, None).unwrap_err();
    assert!(matches!(err, SubmitError::Store(_)));
}

#[test]
fn second_submit_while_in_flight_is_rejected() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let submitter = Submitter::new(BlockingStore {
        entered: entered_tx,
        release: Mutex::new(release_rx),
    });
    let state = form(PortType::Bin);
    let g = grid(&[(1, 1, Tool::Input)]);

    thread::scope(|scope| {
        let first = scope.spawn(|| submitter.submit(&state, &g, None));

        entered_rx.recv().unwrap();
        assert!(submitter.is_submitting());
        let second = submitter.submit(&state, &g, None);
        assert!(matches!(second, Err(SubmitError::InFlight)));

        release_tx.send(()).unwrap();
        let first = first.join().unwrap();
        assert_eq!(first.unwrap().name, "1IBIN");
    });

    assert!(!submitter.is_submitting());
}
