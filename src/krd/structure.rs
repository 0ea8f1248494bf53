//! Repetition-block editing model.
//!
//! Every operation takes the current workout by reference and returns a new
//! one. Top-level steps are re-indexed after each change: a step's
//! `step_index` is its position among top-level steps only, and steps inside
//! a block are numbered from 0 within that block. Blocks are always located
//! by their `id`, never by list position.

use std::collections::BTreeSet;

use thiserror::Error;
use uuid::Uuid;

use crate::krd::types::{KrdDocument, RepetitionBlock, Workout, WorkoutEntry, WorkoutStep};

/// Source of block identity tokens.
pub trait BlockIdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random `block-<uuid>` identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidBlockIdGenerator;

impl BlockIdGenerator for UuidBlockIdGenerator {
    fn next_id(&mut self) -> String {
        format!("block-{}", Uuid::new_v4())
    }
}

/// Deterministic `<prefix>-1`, `<prefix>-2`, ... identifiers.
#[derive(Debug, Clone)]
pub struct SequentialBlockIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialBlockIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl BlockIdGenerator for SequentialBlockIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Errors from structural edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("Repetition block not found: {0}")]
    BlockNotFound(String),

    #[error("Step not found: {0}")]
    StepNotFound(u32),

    #[error("Position {position} out of range for {len} entries")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("Repeat count must be at least 1, got {0}")]
    InvalidRepeatCount(u32),
}

/// Reference to a selected step.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepRef {
    /// Top-level step by `step_index`
    TopLevel(u32),
    /// Step inside a block, by block id and nested `step_index`
    InBlock { block_id: String, step_index: u32 },
}

/// Set of selected steps in an editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    refs: BTreeSet<StepRef>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, step: StepRef) {
        self.refs.insert(step);
    }

    pub fn contains(&self, step: &StepRef) -> bool {
        self.refs.contains(step)
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Selection with every reference into the given block removed.
    pub fn without_block(&self, block_id: &str) -> Selection {
        Selection {
            refs: self
                .refs
                .iter()
                .filter(|r| !matches!(r, StepRef::InBlock { block_id: id, .. } if id == block_id))
                .cloned()
                .collect(),
        }
    }
}

/// Recompute step indices in place.
pub fn reindex(entries: &mut [WorkoutEntry]) {
    let mut next = 0u32;
    for entry in entries.iter_mut() {
        match entry {
            WorkoutEntry::Step(step) => {
                step.step_index = next;
                next += 1;
            }
            WorkoutEntry::Block(block) => reindex_block(block),
        }
    }
}

fn reindex_block(block: &mut RepetitionBlock) {
    for (i, step) in block.steps.iter_mut().enumerate() {
        step.step_index = i as u32;
    }
}

/// Copy of the workout with `entries` as its step list, re-indexed.
fn with_entries(workout: &Workout, mut entries: Vec<WorkoutEntry>) -> Workout {
    reindex(&mut entries);
    Workout {
        steps: entries,
        ..workout.clone()
    }
}

/// List position of the block with the given id.
pub fn find_block_position(workout: &Workout, block_id: &str) -> Option<usize> {
    workout
        .steps
        .iter()
        .position(|entry| matches!(entry, WorkoutEntry::Block(b) if b.id.as_deref() == Some(block_id)))
}

/// The block with the given id.
pub fn find_block<'a>(workout: &'a Workout, block_id: &str) -> Option<&'a RepetitionBlock> {
    find_block_position(workout, block_id).and_then(|pos| workout.steps[pos].as_block())
}

fn require_block(workout: &Workout, block_id: &str) -> Result<usize, StructureError> {
    find_block_position(workout, block_id)
        .ok_or_else(|| StructureError::BlockNotFound(block_id.to_string()))
}

/// List position of the top-level step with the given index.
fn require_step(workout: &Workout, step_index: u32) -> Result<usize, StructureError> {
    workout
        .steps
        .iter()
        .position(|entry| matches!(entry, WorkoutEntry::Step(s) if s.step_index == step_index))
        .ok_or(StructureError::StepNotFound(step_index))
}

/// Give every block without an id a fresh one. Blocks that already have an
/// id keep it; the input is left untouched.
pub fn ensure_block_ids(workout: &Workout, ids: &mut dyn BlockIdGenerator) -> Workout {
    let mut migrated = workout.clone();
    for entry in migrated.steps.iter_mut() {
        if let WorkoutEntry::Block(block) = entry {
            if block.id.is_none() {
                block.id = Some(ids.next_id());
            }
        }
    }
    migrated
}

/// Document-level [`ensure_block_ids`].
pub fn ensure_document_block_ids(krd: &KrdDocument, ids: &mut dyn BlockIdGenerator) -> KrdDocument {
    let mut migrated = krd.clone();
    if let Some(workout) = krd.workout() {
        migrated.extensions.workout = Some(ensure_block_ids(workout, ids));
    }
    migrated
}

/// Move the selected top-level steps into a new repetition block.
///
/// The block lands where the earliest selected step was; selected steps keep
/// their relative order. An empty selection, a selection matching no step, or
/// a repeat count below 2 leaves the workout unchanged.
pub fn wrap_steps_in_block(
    workout: &Workout,
    step_indices: &[u32],
    repeat_count: u32,
    ids: &mut dyn BlockIdGenerator,
) -> Workout {
    if step_indices.is_empty() || repeat_count < 2 {
        return workout.clone();
    }

    let selected: BTreeSet<u32> = step_indices.iter().copied().collect();
    let mut extracted = Vec::new();
    let mut remaining = Vec::with_capacity(workout.steps.len());
    let mut insert_at = None;

    for entry in &workout.steps {
        match entry {
            WorkoutEntry::Step(step) if selected.contains(&step.step_index) => {
                insert_at.get_or_insert(remaining.len());
                extracted.push(step.clone());
            }
            other => remaining.push(other.clone()),
        }
    }

    let Some(insert_at) = insert_at else {
        return workout.clone();
    };

    let block = RepetitionBlock {
        id: Some(ids.next_id()),
        repeat_count,
        steps: extracted,
    };
    tracing::debug!(
        block_id = block.id.as_deref().unwrap_or_default(),
        steps = block.steps.len(),
        repeat_count,
        "Wrapped steps in repetition block"
    );
    remaining.insert(insert_at, WorkoutEntry::Block(block));

    with_entries(workout, remaining)
}

/// Dissolve a block, splicing its steps in at the block's position.
pub fn unwrap_block(workout: &Workout, block_id: &str) -> Result<Workout, StructureError> {
    let position = require_block(workout, block_id)?;
    let mut entries = workout.steps.clone();

    let WorkoutEntry::Block(block) = entries.remove(position) else {
        return Err(StructureError::BlockNotFound(block_id.to_string()));
    };
    entries.splice(position..position, block.steps.into_iter().map(WorkoutEntry::Step));

    Ok(with_entries(workout, entries))
}

/// Remove a block with all its steps and drop selection references into it.
pub fn delete_block(
    workout: &Workout,
    block_id: &str,
    selection: &Selection,
) -> Result<(Workout, Selection), StructureError> {
    let position = require_block(workout, block_id)?;
    let mut entries = workout.steps.clone();
    entries.remove(position);

    Ok((
        with_entries(workout, entries),
        selection.without_block(block_id),
    ))
}

/// Change how many times a block repeats.
pub fn set_repeat_count(
    workout: &Workout,
    block_id: &str,
    repeat_count: u32,
) -> Result<Workout, StructureError> {
    if repeat_count < 1 {
        return Err(StructureError::InvalidRepeatCount(repeat_count));
    }
    let position = require_block(workout, block_id)?;
    let mut entries = workout.steps.clone();
    if let WorkoutEntry::Block(block) = &mut entries[position] {
        block.repeat_count = repeat_count;
    }
    Ok(with_entries(workout, entries))
}

/// Append a step to the end of a block.
pub fn add_step_to_block(
    workout: &Workout,
    block_id: &str,
    step: WorkoutStep,
) -> Result<Workout, StructureError> {
    let position = require_block(workout, block_id)?;
    let mut entries = workout.steps.clone();
    if let WorkoutEntry::Block(block) = &mut entries[position] {
        block.steps.push(step);
    }
    Ok(with_entries(workout, entries))
}

/// Remove the step with the given nested index from a block.
pub fn remove_step_from_block(
    workout: &Workout,
    block_id: &str,
    step_index: u32,
) -> Result<Workout, StructureError> {
    let position = require_block(workout, block_id)?;
    let mut entries = workout.steps.clone();
    if let WorkoutEntry::Block(block) = &mut entries[position] {
        let nested = block
            .steps
            .iter()
            .position(|s| s.step_index == step_index)
            .ok_or(StructureError::StepNotFound(step_index))?;
        block.steps.remove(nested);
    }
    Ok(with_entries(workout, entries))
}

/// Insert a step at a list position (0..=len).
pub fn insert_step(
    workout: &Workout,
    position: usize,
    step: WorkoutStep,
) -> Result<Workout, StructureError> {
    let len = workout.steps.len();
    if position > len {
        return Err(StructureError::PositionOutOfRange { position, len });
    }
    let mut entries = workout.steps.clone();
    entries.insert(position, WorkoutEntry::Step(step));
    Ok(with_entries(workout, entries))
}

/// Remove a top-level step.
pub fn delete_step(workout: &Workout, step_index: u32) -> Result<Workout, StructureError> {
    let position = require_step(workout, step_index)?;
    let mut entries = workout.steps.clone();
    entries.remove(position);
    Ok(with_entries(workout, entries))
}

/// Insert a copy of a top-level step right after it.
pub fn duplicate_step(workout: &Workout, step_index: u32) -> Result<Workout, StructureError> {
    let position = require_step(workout, step_index)?;
    let mut entries = workout.steps.clone();
    let copy = entries[position].clone();
    entries.insert(position + 1, copy);
    Ok(with_entries(workout, entries))
}

/// Insert a copy of a block right after it. The copy gets a new id.
pub fn duplicate_block(
    workout: &Workout,
    block_id: &str,
    ids: &mut dyn BlockIdGenerator,
) -> Result<Workout, StructureError> {
    let position = require_block(workout, block_id)?;
    let mut entries = workout.steps.clone();
    let Some(mut copy) = entries[position].as_block().cloned() else {
        return Err(StructureError::BlockNotFound(block_id.to_string()));
    };
    copy.id = Some(ids.next_id());
    entries.insert(position + 1, WorkoutEntry::Block(copy));
    Ok(with_entries(workout, entries))
}

/// Move the entry at `from` so it ends up at `to`.
pub fn move_entry(workout: &Workout, from: usize, to: usize) -> Result<Workout, StructureError> {
    let len = workout.steps.len();
    for position in [from, to] {
        if position >= len {
            return Err(StructureError::PositionOutOfRange { position, len });
        }
    }
    let mut entries = workout.steps.clone();
    let entry = entries.remove(from);
    entries.insert(to, entry);
    Ok(with_entries(workout, entries))
}

/// Move a block, located by id, to list position `to`.
pub fn move_block(workout: &Workout, block_id: &str, to: usize) -> Result<Workout, StructureError> {
    let from = require_block(workout, block_id)?;
    move_entry(workout, from, to)
}

/// A block repetition a display bar belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOccurrence<'a> {
    /// Owning block's id, shared by every bar of every repetition
    pub block_id: Option<&'a str>,
    /// 0-based repetition number
    pub repetition: u32,
    pub repeat_count: u32,
}

/// One bar of the flattened workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBar<'a> {
    /// 0-based position in the flattened sequence
    pub position: usize,
    pub step: &'a WorkoutStep,
    pub block: Option<BlockOccurrence<'a>>,
}

/// Lazy iterator over display bars. See [`flatten_for_display`].
#[derive(Debug, Clone)]
pub struct DisplayBars<'a> {
    entries: &'a [WorkoutEntry],
    entry: usize,
    repetition: u32,
    nested: usize,
    position: usize,
}

impl<'a> Iterator for DisplayBars<'a> {
    type Item = DisplayBar<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = self.entries.get(self.entry)?;
            match entry {
                WorkoutEntry::Step(step) => {
                    self.entry += 1;
                    let bar = DisplayBar {
                        position: self.position,
                        step,
                        block: None,
                    };
                    self.position += 1;
                    return Some(bar);
                }
                WorkoutEntry::Block(block) => {
                    let Some(step) = block.steps.get(self.nested) else {
                        self.advance_entry();
                        continue;
                    };
                    if self.repetition >= block.repeat_count {
                        self.advance_entry();
                        continue;
                    }

                    let bar = DisplayBar {
                        position: self.position,
                        step,
                        block: Some(BlockOccurrence {
                            block_id: block.id.as_deref(),
                            repetition: self.repetition,
                            repeat_count: block.repeat_count,
                        }),
                    };
                    self.position += 1;
                    self.nested += 1;
                    if self.nested >= block.steps.len() {
                        self.nested = 0;
                        self.repetition += 1;
                    }
                    return Some(bar);
                }
            }
        }
    }
}

impl DisplayBars<'_> {
    fn advance_entry(&mut self) {
        self.entry += 1;
        self.repetition = 0;
        self.nested = 0;
    }
}

/// Expand a workout into one bar per executed step: a block repeated N
/// times contributes N copies of its steps, each tagged with the block.
pub fn flatten_for_display(workout: &Workout) -> DisplayBars<'_> {
    DisplayBars {
        entries: &workout.steps,
        entry: 0,
        repetition: 0,
        nested: 0,
        position: 0,
    }
}
