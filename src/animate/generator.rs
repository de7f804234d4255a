use crate::animate::sequence::{FrameSequence, SkippedFrame};
use crate::foundation::error::{VoyageError, VoyageResult};
use crate::render::backend::RenderBackend;
use crate::scene::composer::StaticComposer;
use crate::tracks::table::{GroupBy, GroupKey, KeyOrder, TrackTable};

/// Lifecycle of a [`FrameSequenceGenerator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeneratorState {
    /// Ready to run; the sequence is empty.
    #[default]
    Idle,
    /// A run is in progress.
    Capturing,
    /// A run finished (successfully or not); call `reset` before the next one.
    Done,
}

/// What a run does when one frame fails to compose or render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the whole run and discard every captured frame.
    #[default]
    Abort,
    /// Log the failure, record the key as skipped and continue.
    SkipFrame,
}

/// Options for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratorOpts {
    /// Attribute partitioning the table into frames.
    pub group_by: GroupBy,
    /// Order of distinct values when `keys` is not given.
    pub order: KeyOrder,
    /// Per-frame failure handling.
    pub policy: FailurePolicy,
    /// Explicit keys to render, in this order, instead of the distinct values of the table.
    pub keys: Option<Vec<GroupKey>>,
}

/// Produces one frame per distinct grouping value and accumulates them in a [`FrameSequence`].
///
/// Frames are captured strictly one after another on the caller's backend, which is the single
/// rendering surface for the run.
#[derive(Debug, Default)]
pub struct FrameSequenceGenerator {
    opts: GeneratorOpts,
    state: GeneratorState,
    sequence: FrameSequence,
}

impl FrameSequenceGenerator {
    /// Create an idle generator.
    pub fn new(opts: GeneratorOpts) -> Self {
        Self {
            opts,
            state: GeneratorState::Idle,
            sequence: FrameSequence::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Options of this generator.
    pub fn opts(&self) -> &GeneratorOpts {
        &self.opts
    }

    /// Frames captured so far.
    pub fn sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    /// Consume the generator and return the captured frames.
    pub fn into_sequence(self) -> FrameSequence {
        self.sequence
    }

    /// Discard captured frames and return to [`GeneratorState::Idle`].
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.state = GeneratorState::Idle;
    }

    /// Keys a run over `table` would visit, in visit order.
    pub fn plan_keys(&self, table: &TrackTable) -> VoyageResult<Vec<GroupKey>> {
        match &self.opts.keys {
            Some(keys) => Ok(keys.clone()),
            None => table.distinct_keys(self.opts.group_by, self.opts.order),
        }
    }

    /// Capture one frame per key into the sequence.
    ///
    /// On failure under [`FailurePolicy::Abort`] the sequence is emptied and the state is
    /// [`GeneratorState::Done`]; `reset` is required before running again.
    #[tracing::instrument(skip_all, fields(rows = table.len(), group_by = ?self.opts.group_by))]
    pub fn run(
        &mut self,
        table: &TrackTable,
        composer: &StaticComposer,
        backend: &mut dyn RenderBackend,
    ) -> VoyageResult<&FrameSequence> {
        if self.state != GeneratorState::Idle {
            return Err(VoyageError::validation(format!(
                "generator is {:?}; call reset() before running again",
                self.state
            )));
        }
        self.state = GeneratorState::Capturing;

        match self.capture_all(table, composer, backend) {
            Ok(()) => {
                self.state = GeneratorState::Done;
                tracing::info!(
                    frames = self.sequence.len(),
                    skipped = self.sequence.skipped().len(),
                    "capture finished"
                );
                Ok(&self.sequence)
            }
            Err(e) => {
                self.sequence.clear();
                self.state = GeneratorState::Done;
                tracing::error!(stage = e.stage(), error = %e, "capture aborted");
                Err(e)
            }
        }
    }

    fn capture_all(
        &mut self,
        table: &TrackTable,
        composer: &StaticComposer,
        backend: &mut dyn RenderBackend,
    ) -> VoyageResult<()> {
        let keys = self.plan_keys(table)?;
        tracing::debug!(keys = keys.len(), "planned frames");

        for (i, key) in keys.into_iter().enumerate() {
            match self.capture_one(table, composer, backend, &key) {
                Ok(()) => {}
                Err(e) if self.opts.policy == FailurePolicy::SkipFrame => {
                    tracing::warn!(%key, stage = e.stage(), error = %e, "skipping frame");
                    self.sequence.push_skipped(SkippedFrame {
                        key,
                        stage: e.stage(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e.context(format!("frame {i} ({key})"))),
            }
        }
        Ok(())
    }

    fn capture_one(
        &mut self,
        table: &TrackTable,
        composer: &StaticComposer,
        backend: &mut dyn RenderBackend,
        key: &GroupKey,
    ) -> VoyageResult<()> {
        let view = table.filter(self.opts.group_by, key)?;
        let title = composer.title_for(&key.to_string());
        let scene = composer.compose(&view, &title)?;
        let stats = scene.stats();
        let frame = backend.render_scene(&scene)?;
        tracing::debug!(%key, segments = stats.segments, points = stats.points, "captured frame");
        self.sequence.push(key.clone(), title, stats, frame);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animate/generator.rs"]
mod tests;
