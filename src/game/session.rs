use crate::core::clock::AudioClock;
use crate::core::input::InputProvider;
use crate::game::gameplay::{self, State};
use crate::game::judgment::{JudgmentEvent, ScoreState};
use crate::game::processing::ProcessedBeatmap;
use std::sync::Arc;

/// One play of one beatmap. Owns the judgment state and the collaborator
/// handles; every component works through this context, never through
/// ambient globals. An external scheduler calls `tick()` once per frame;
/// rendering reads the session without ever advancing it.
pub struct GameplaySession<C: AudioClock, I: InputProvider> {
    state: State,
    clock: C,
    input: I,
}

impl<C: AudioClock, I: InputProvider> GameplaySession<C, I> {
    pub fn new(map: Arc<ProcessedBeatmap>, clock: C, input: I, mod_multiplier: f64) -> Self {
        Self {
            state: gameplay::init(map, mod_multiplier),
            clock,
            input,
        }
    }

    /// Samples the audio clock once, drains queued input, and advances every
    /// on-screen object. Returns the tick's judgment events for the HUD and
    /// hit-sound layers.
    pub fn tick(&mut self) -> Vec<JudgmentEvent> {
        if !self.clock.has_started() {
            return Vec::new();
        }
        let now_ms = self.clock.now_ms();
        for edge in self.input.drain_edges() {
            gameplay::queue_press(&mut self.state, edge);
        }
        gameplay::tick(&mut self.state, now_ms, self.input.pointer())
    }

    pub fn score(&self) -> &ScoreState {
        &self.state.score
    }

    pub fn map(&self) -> &ProcessedBeatmap {
        &self.state.map
    }

    pub fn is_complete(&self) -> bool {
        gameplay::is_complete(&self.state)
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::input::QueuedInput;
    use crate::game::processing::process;
    use crate::game::processing::tests::{circle_at, test_beatmap};
    use cgmath::Vector2;

    fn session() -> GameplaySession<ManualClock, QueuedInput> {
        let processed = process(&test_beatmap(vec![circle_at(100.0, 100.0, 1000.0, false)]));
        GameplaySession::new(Arc::new(processed), ManualClock::new(), QueuedInput::new(), 1.0)
    }

    #[test]
    fn ticks_are_inert_before_playback_starts() {
        let mut session = session();
        assert!(session.tick().is_empty());
        assert_eq!(session.score().total_count, 0);
    }

    #[test]
    fn session_drives_judgments_from_its_clock() {
        let mut session = session();
        session.clock_mut().set_ms(1000.0);
        session.input_mut().press(Vector2::new(100.0, 100.0), 1000.0);

        let events = session.tick();
        assert_eq!(events.len(), 1);
        assert!(events[0].tier.is_hit());
        assert_eq!(session.score().combo, 1);
        assert!(session.is_complete());
    }

    #[test]
    fn stopping_midway_rolls_nothing_back() {
        let mut session = session();
        session.clock_mut().set_ms(500.0);
        session.tick();
        // Play simply stops: state is whatever the last tick left behind.
        assert_eq!(session.score().total_count, 0);
        assert!(!session.is_complete());
    }
}
