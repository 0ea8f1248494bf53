//! Integration tests for loading, editing and saving workouts

use kaiord::config::{load_config_from, save_config_to, AppConfig};
use kaiord::krd::structure::{
    ensure_document_block_ids, flatten_for_display, set_repeat_count, unwrap_block,
    wrap_steps_in_block, SequentialBlockIdGenerator,
};
use kaiord::krd::types::KrdDocument;
use kaiord::tcx::{read_tcx, StructuralValidator, TcxWriter};
use std::fs;
use tempfile::TempDir;

fn load_fixture() -> KrdDocument {
    let xml = fs::read_to_string("tests/fixtures/workouts/sweet_spot_intervals.tcx")
        .expect("Failed to read fixture");
    read_tcx(&xml).expect("Failed to read fixture")
}

#[tokio::test]
async fn test_edit_and_save_workout() {
    let mut ids = SequentialBlockIdGenerator::new("block");
    let krd = ensure_document_block_ids(&load_fixture(), &mut ids);
    let workout = krd.workout().unwrap();

    let block_id = workout.blocks().next().and_then(|b| b.id.clone()).unwrap();
    assert_eq!(block_id, "block-1");

    // two block steps three times, plus three single steps
    assert_eq!(flatten_for_display(workout).count(), 3 * 2 + 3);

    let edited = set_repeat_count(workout, &block_id, 5).unwrap();
    let edited = unwrap_block(&edited, &block_id).unwrap();
    let edited = wrap_steps_in_block(&edited, &[3, 4], 2, &mut ids);

    let mut saved = krd.clone();
    saved.extensions.workout = Some(edited.clone());

    let xml = TcxWriter::new(StructuralValidator::new())
        .write(&saved)
        .await
        .expect("Failed to write edited workout");
    let reloaded = ensure_document_block_ids(
        &read_tcx(&xml).unwrap(),
        &mut SequentialBlockIdGenerator::new("reloaded"),
    );
    let reloaded_workout = reloaded.workout().unwrap();

    let names: Vec<Option<&str>> = reloaded_workout
        .top_level_steps()
        .map(|s| s.name.as_deref())
        .collect();
    assert_eq!(names, vec![Some("Warm Up"), Some("Work"), Some("Recover")]);

    let block = reloaded_workout.blocks().next().unwrap();
    assert_eq!(block.id.as_deref(), Some("reloaded-1"));
    assert_eq!(block.repeat_count, 2);
    assert_eq!(
        block.steps.iter().map(|s| s.name.as_deref()).collect::<Vec<_>>(),
        vec![Some("Burn"), Some("Cool Down")]
    );
    assert_eq!(block.steps[0].duration, edited.blocks().next().unwrap().steps[0].duration);
}

#[tokio::test]
async fn test_config_drives_writer_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = AppConfig::default();
    config.output.xml_indent = 0;
    save_config_to(&config, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    let xml = TcxWriter::new(StructuralValidator::new())
        .with_options(loaded.output.xml_options())
        .write(&load_fixture())
        .await
        .unwrap();

    assert!(xml.starts_with("<?xml"));
    assert!(!xml.contains("\n  <Workouts>"));
    assert!(xml.contains("<Workouts><Workout Sport=\"Biking\">"));
}
