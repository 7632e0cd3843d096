//! Bounded random-replacement shuffling of a pipeline stage.

use std::mem;

use log::debug;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::DataPipeline;
use crate::error::PipelineError;

/// Reorders an upstream pipeline through a fixed-capacity reservoir.
///
/// The buffer is filled lazily on the first pull. Afterwards every pull
/// draws a uniformly random slot, emits its record and refills the slot
/// from upstream; once upstream exhausts, the buffer drains by
/// swap-removal. A `window` of 0 removes the capacity bound: the whole
/// upstream is materialized before anything is emitted. A `window` of 1
/// degenerates to pass-through order.
///
/// The generator is owned by the stage, never ambient. Its pristine copy is
/// retained so [`reset`](DataPipeline::reset) replays the identical order.
pub struct ShuffleStage<P, R = ChaCha8Rng>
where
    P: DataPipeline,
{
    source: P,
    window: usize,
    strict: bool,
    buffer: Vec<P::Item>,
    rng: R,
    seed_rng: R,
}

/// Checkpoint state of a [`ShuffleStage`]: buffer contents (strict stages
/// only), the upstream's own state, and the generator state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShuffleState<T, S, R> {
    buffer: Option<Vec<T>>,
    source: S,
    rng: R,
}

impl<P> ShuffleStage<P, ChaCha8Rng>
where
    P: DataPipeline,
    P::Item: Clone,
{
    /// Shuffle `source` through a reservoir of capacity `window`, drawing
    /// from a generator seeded deterministically with `seed`.
    pub fn new(source: P, window: usize, seed: u64) -> Self {
        Self::with_rng(source, window, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<P, R> ShuffleStage<P, R>
where
    P: DataPipeline,
    P::Item: Clone,
    R: RngCore + Clone,
{
    /// Shuffle `source` drawing from an injected generator.
    pub fn with_rng(source: P, window: usize, rng: R) -> Self {
        Self {
            source,
            window,
            strict: true,
            buffer: Vec::new(),
            seed_rng: rng.clone(),
            rng,
        }
    }

    /// With `strict` disabled, checkpoints omit the buffer contents and a
    /// restore lets the fill phase redo work from the restored upstream
    /// position, trading exactness for cheaper state.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn fill(&mut self) -> Result<(), PipelineError> {
        while self.window == 0 || self.buffer.len() < self.window {
            match self.source.next()? {
                Some(item) => self.buffer.push(item),
                None => break,
            }
        }
        Ok(())
    }

    fn draw(&mut self) -> usize {
        (self.rng.next_u64() % self.buffer.len() as u64) as usize
    }
}

impl<P, R> DataPipeline for ShuffleStage<P, R>
where
    P: DataPipeline,
    P::Item: Clone,
    P::State: Clone,
    R: RngCore + Clone,
{
    type Item = P::Item;
    type State = ShuffleState<P::Item, P::State, R>;

    fn next(&mut self) -> Result<Option<P::Item>, PipelineError> {
        self.fill()?;
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let idx = self.draw();
        match self.source.next()? {
            Some(item) => Ok(Some(mem::replace(&mut self.buffer[idx], item))),
            None => Ok(Some(self.buffer.swap_remove(idx))),
        }
    }

    fn reset(&mut self) -> Result<(), PipelineError> {
        self.source.reset()?;
        self.buffer.clear();
        self.rng = self.seed_rng.clone();
        Ok(())
    }

    fn checkpoint(&self) -> Self::State {
        ShuffleState {
            buffer: self.strict.then(|| self.buffer.clone()),
            source: self.source.checkpoint(),
            rng: self.rng.clone(),
        }
    }

    fn restore(&mut self, state: Self::State) -> Result<(), PipelineError> {
        self.source.restore(state.source)?;
        self.rng = state.rng;
        match state.buffer {
            Some(buffer) => self.buffer = buffer,
            None if self.strict => return Err(PipelineError::BufferNotReconstructible),
            None => {
                debug!("restoring without buffer contents; the fill phase will redo work");
                self.buffer.clear();
            }
        }
        Ok(())
    }
}
