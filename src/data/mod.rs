//! Composable pull-based data pipeline stages.
//!
//! Stages are single-threaded, lazy producers: a consumer loop pulls records
//! with [`next`](DataPipeline::next) and may capture a
//! [`checkpoint`](DataPipeline::checkpoint) between any two pulls. Restoring
//! a checkpoint resumes the stream byte-for-byte as if it had never paused.

pub mod shuffle;

pub use shuffle::{ShuffleStage, ShuffleState};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// A resumable, pull-based producer of records.
///
/// `next` returning `Ok(None)` signals exhaustion. The signal is sticky: it
/// is part of the stage's state and survives checkpoint/restore cycles.
pub trait DataPipeline {
    type Item;
    type State: Clone;

    /// Produce the next record, or `None` once the stream is exhausted.
    fn next(&mut self) -> Result<Option<Self::Item>, PipelineError>;

    /// Rewind to the start, re-consuming upstream from scratch and
    /// re-seeding any internal generator deterministically.
    fn reset(&mut self) -> Result<(), PipelineError>;

    /// Capture a snapshot sufficient to resume exactly where we are.
    fn checkpoint(&self) -> Self::State;

    /// Resume from a captured snapshot.
    fn restore(&mut self, state: Self::State) -> Result<(), PipelineError>;
}

/// In-memory upstream producing a fixed sequence of records.
#[derive(Debug, Clone)]
pub struct SequenceSource<T> {
    items: Vec<T>,
    pos: usize,
}

/// Checkpoint state of a [`SequenceSource`]: the replay position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceState {
    pos: usize,
}

impl<T> SequenceSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, pos: 0 }
    }
}

impl<T: Clone> DataPipeline for SequenceSource<T> {
    type Item = T;
    type State = SequenceState;

    fn next(&mut self) -> Result<Option<T>, PipelineError> {
        match self.items.get(self.pos) {
            Some(item) => {
                self.pos += 1;
                Ok(Some(item.clone()))
            }
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> Result<(), PipelineError> {
        self.pos = 0;
        Ok(())
    }

    fn checkpoint(&self) -> SequenceState {
        SequenceState { pos: self.pos }
    }

    fn restore(&mut self, state: SequenceState) -> Result<(), PipelineError> {
        if state.pos > self.items.len() {
            return Err(PipelineError::PositionOutOfRange {
                pos: state.pos,
                len: self.items.len(),
            });
        }
        self.pos = state.pos;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn drain<P: DataPipeline>(pipeline: &mut P, limit: usize) -> Vec<P::Item> {
    let mut out = Vec::new();
    while out.len() < limit {
        match pipeline.next().unwrap() {
            Some(item) => out.push(item),
            None => break,
        }
    }
    out
}
