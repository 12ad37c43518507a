use crate::parsing::beatmap::Pos;
use cgmath::Vector2;
use std::collections::VecDeque;

/// Pointer snapshot sampled once per tick.
#[derive(Debug, Clone, Copy)]
pub struct PointerState {
    pub position: Pos,
    pub held: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: Vector2::new(0.0, 0.0),
            held: false,
        }
    }
}

/// A discrete press captured between ticks. Edges are queued as they arrive
/// and only consulted at tick boundaries.
#[derive(Debug, Clone, Copy)]
pub struct InputEdge {
    pub position: Pos,
    pub time_ms: f64,
}

/// What the judgment engine needs from the input layer: the current pointer
/// and whatever presses accumulated since the last tick.
pub trait InputProvider {
    fn pointer(&self) -> PointerState;
    fn drain_edges(&mut self) -> Vec<InputEdge>;
}

/// Queue-backed provider for tests, replays and headless drivers.
#[derive(Debug, Default)]
pub struct QueuedInput {
    pointer: PointerState,
    pending_edges: VecDeque<InputEdge>,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pointer(&mut self, position: Pos, held: bool) {
        self.pointer = PointerState { position, held };
    }

    pub fn press(&mut self, position: Pos, time_ms: f64) {
        self.pointer = PointerState {
            position,
            held: true,
        };
        self.pending_edges.push_back(InputEdge { position, time_ms });
    }

    pub fn release(&mut self) {
        self.pointer.held = false;
    }
}

impl InputProvider for QueuedInput {
    fn pointer(&self) -> PointerState {
        self.pointer
    }

    fn drain_edges(&mut self) -> Vec<InputEdge> {
        self.pending_edges.drain(..).collect()
    }
}
