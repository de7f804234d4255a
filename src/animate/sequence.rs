use crate::render::backend::FrameRGBA;
use crate::scene::layer::SceneStats;
use crate::tracks::table::GroupKey;

/// One captured rendering plus what it was rendered from.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedFrame {
    /// Position in the sequence, starting at 0.
    pub index: usize,
    /// Grouping value of the frame.
    pub key: GroupKey,
    /// Title text of the scene.
    pub title: String,
    /// Route statistics of the scene.
    pub stats: SceneStats,
    /// Pixels.
    pub frame: FrameRGBA,
}

/// A key whose frame was dropped under [`crate::FailurePolicy::SkipFrame`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFrame {
    /// Grouping value of the dropped frame.
    pub key: GroupKey,
    /// Stage that failed.
    pub stage: &'static str,
    /// Diagnostic text.
    pub reason: String,
}

/// Ordered, append-only collection of frames produced by one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameSequence {
    frames: Vec<CapturedFrame>,
    skipped: Vec<SkippedFrame>,
}

impl FrameSequence {
    /// Empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: GroupKey, title: String, stats: SceneStats, frame: FrameRGBA) {
        let index = self.frames.len();
        self.frames.push(CapturedFrame {
            index,
            key,
            title,
            stats,
            frame,
        });
    }

    pub(crate) fn push_skipped(&mut self, skipped: SkippedFrame) {
        self.skipped.push(skipped);
    }

    pub(crate) fn clear(&mut self) {
        self.frames.clear();
        self.skipped.clear();
    }

    /// Number of captured frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Captured frames in capture order.
    pub fn frames(&self) -> &[CapturedFrame] {
        &self.frames
    }

    /// Iterate captured frames in capture order.
    pub fn iter(&self) -> std::slice::Iter<'_, CapturedFrame> {
        self.frames.iter()
    }

    /// Frame captured for `key`, if any.
    pub fn get(&self, key: &GroupKey) -> Option<&CapturedFrame> {
        self.frames.iter().find(|f| &f.key == key)
    }

    /// Keys dropped by the skip policy.
    pub fn skipped(&self) -> &[SkippedFrame] {
        &self.skipped
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a CapturedFrame;
    type IntoIter = std::slice::Iter<'a, CapturedFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
