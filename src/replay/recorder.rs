//! Recorder sinks that consume frames as the engine produces them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use super::frame::{EpisodeMetadata, Frame, ReplayRecord};

/// Consumer of per-tick frames and end-of-episode metadata.
///
/// The engine calls `record_frame` after reset (frame 0) and after every
/// tick, and `finish_episode` once when the episode terminates.
pub trait Recorder: Send {
    fn record_frame(&mut self, frame: &Frame);

    fn finish_episode(&mut self, metadata: &EpisodeMetadata);
}

/// Keeps the most recent finished episodes in memory.
///
/// FIFO: when `max_episodes` is reached the oldest record is dropped.
/// Frames of an episode that never terminates (abandoned by a reset) are
/// discarded when the next episode starts.
#[derive(Clone, Debug)]
pub struct MemoryRecorder {
    episodes: VecDeque<ReplayRecord>,
    pending: im::Vector<Frame>,
    max_episodes: usize,
}

impl MemoryRecorder {
    pub fn new(max_episodes: usize) -> Self {
        Self {
            episodes: VecDeque::with_capacity(max_episodes),
            pending: im::Vector::new(),
            max_episodes: max_episodes.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn episodes(&self) -> impl Iterator<Item = &ReplayRecord> {
        self.episodes.iter()
    }

    pub fn latest(&self) -> Option<&ReplayRecord> {
        self.episodes.back()
    }

    /// Frames of the episode still in progress.
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    pub fn drain(&mut self) -> Vec<ReplayRecord> {
        self.episodes.drain(..).collect()
    }
}

impl Default for MemoryRecorder {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Recorder for MemoryRecorder {
    fn record_frame(&mut self, frame: &Frame) {
        if frame.step == 0 {
            self.pending.clear();
        }
        self.pending.push_back(frame.clone());
    }

    fn finish_episode(&mut self, metadata: &EpisodeMetadata) {
        if self.episodes.len() >= self.max_episodes {
            self.episodes.pop_front();
        }
        let frames = std::mem::take(&mut self.pending);
        self.episodes.push_back(ReplayRecord::new(metadata.clone(), frames));
    }
}

/// A recorder shared with the caller, who can inspect it while the
/// engine keeps writing.
impl<R: Recorder> Recorder for Arc<Mutex<R>> {
    fn record_frame(&mut self, frame: &Frame) {
        self.lock().unwrap_or_else(PoisonError::into_inner).record_frame(frame);
    }

    fn finish_episode(&mut self, metadata: &EpisodeMetadata) {
        self.lock().unwrap_or_else(PoisonError::into_inner).finish_episode(metadata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AgentMap, ArenaConfig, Vec2, WorldState};

    fn world() -> WorldState {
        let config = ArenaConfig::default();
        let positions = AgentMap::new(|a| Vec2::new(2.0, 2.0 + a.index() as f64));
        WorldState::new(&positions, &config.flag_spawns)
    }

    #[test]
    fn test_records_episode() {
        let config = ArenaConfig::default();
        let mut world = world();
        let mut recorder = MemoryRecorder::new(2);

        recorder.record_frame(&Frame::capture(&world));
        world.current_step = 1;
        recorder.record_frame(&Frame::capture(&world));
        assert_eq!(recorder.pending_frames(), 2);
        assert!(recorder.is_empty());

        recorder.finish_episode(&EpisodeMetadata::new(&config, &world, "balanced", None));
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.latest().unwrap().len(), 2);
        assert_eq!(recorder.pending_frames(), 0);
    }

    #[test]
    fn test_abandoned_episode_is_discarded() {
        let config = ArenaConfig::default();
        let mut world = world();
        let mut recorder = MemoryRecorder::new(2);

        recorder.record_frame(&Frame::capture(&world));
        world.current_step = 1;
        recorder.record_frame(&Frame::capture(&world));

        // New episode starts without the old one finishing.
        world.current_step = 0;
        recorder.record_frame(&Frame::capture(&world));
        recorder.finish_episode(&EpisodeMetadata::new(&config, &world, "balanced", None));
        assert_eq!(recorder.latest().unwrap().len(), 1);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let config = ArenaConfig::default();
        let mut world = world();
        let mut recorder = MemoryRecorder::new(2);

        for seed in 0..3 {
            world.current_step = 0;
            recorder.record_frame(&Frame::capture(&world));
            recorder.finish_episode(&EpisodeMetadata::new(&config, &world, "balanced", Some(seed)));
        }

        let seeds: Vec<_> = recorder.episodes().map(|r| r.metadata.seed).collect();
        assert_eq!(seeds, vec![Some(1), Some(2)]);
        assert_eq!(recorder.drain().len(), 2);
        assert!(recorder.is_empty());
    }
}
