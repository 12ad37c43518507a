use crate::config::{
    PLAYFIELD_CENTER_X, PLAYFIELD_CENTER_Y, SCORE_REPEAT, SCORE_SLIDER_HEAD, SCORE_TICK,
    SEEK_DISCONTINUITY_MS, SPINNER_MAX_TURN_PER_MS,
};
use crate::core::input::{InputEdge, PointerState};
use crate::game::judgment::{
    HitWindows, JudgeTier, JudgmentEvent, JudgmentEventKind, ScoreState, difficulty_multiplier,
};
use crate::game::processing::{ProcessedBeatmap, ProcessedKind};
use crate::parsing::beatmap::Pos;
use cgmath::MetricSpace;
use log::{debug, info};
use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::sync::Arc;

const SPINNER_GOOD_RATIO: f64 = 0.9;
const SPINNER_MEH_RATIO: f64 = 0.75;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Hit,
    Missed,
    Scored,
    Removed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CheckpointKind {
    Tick,
    Repeat,
}

#[derive(Copy, Clone, Debug)]
struct Checkpoint {
    completion: f64,
    kind: CheckpointKind,
}

#[derive(Debug, Clone)]
enum Runtime {
    Circle,
    Slider {
        head_judged: bool,
        checkpoints: Vec<Checkpoint>,
        next_checkpoint: usize,
        /// Head + ticks + repeat ends credited so far.
        hits: u32,
    },
    Spinner {
        rotations: f64,
        last_angle: Option<f64>,
    },
}

#[derive(Debug, Clone)]
struct ObjectState {
    phase: Phase,
    runtime: Runtime,
}

/// Per-play judgment state. Owns the only mutable per-object fields; the
/// processed beatmap itself stays read-only for the whole play.
pub struct State {
    pub map: Arc<ProcessedBeatmap>,
    pub score: ScoreState,
    windows: HitWindows,
    radius: f32,
    preempt: f64,
    difficulty_multiplier: u32,
    mod_multiplier: f64,
    objects: Vec<ObjectState>,
    first_active: usize,
    last_tick_ms: Option<f64>,
    pending_edges: VecDeque<InputEdge>,
}

pub fn init(map: Arc<ProcessedBeatmap>, mod_multiplier: f64) -> State {
    let objects = map
        .objects
        .iter()
        .map(|object| ObjectState {
            phase: Phase::Pending,
            runtime: match &object.kind {
                ProcessedKind::Circle => Runtime::Circle,
                ProcessedKind::Spinner => Runtime::Spinner {
                    rotations: 0.0,
                    last_angle: None,
                },
                ProcessedKind::Slider {
                    repeat_count,
                    tick_completions,
                    ..
                } => {
                    let mut checkpoints: Vec<Checkpoint> = tick_completions
                        .iter()
                        .map(|&completion| Checkpoint {
                            completion,
                            kind: CheckpointKind::Tick,
                        })
                        .chain((1..=*repeat_count).map(|cycle| Checkpoint {
                            completion: cycle as f64,
                            kind: CheckpointKind::Repeat,
                        }))
                        .collect();
                    checkpoints.sort_by(|a, b| {
                        a.completion
                            .partial_cmp(&b.completion)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
                    Runtime::Slider {
                        head_judged: false,
                        checkpoints,
                        next_checkpoint: 0,
                        hits: 0,
                    }
                }
            },
        })
        .collect();

    info!(
        "Judgment engine armed: {} objects, OD {:.1}.",
        map.objects.len(),
        map.difficulty.overall_difficulty
    );

    State {
        windows: HitWindows::from_overall_difficulty(map.difficulty.overall_difficulty),
        radius: map.difficulty.circle_radius(),
        preempt: map.difficulty.preempt_ms(),
        difficulty_multiplier: difficulty_multiplier(&map.difficulty),
        mod_multiplier,
        score: ScoreState::default(),
        objects,
        first_active: 0,
        last_tick_ms: None,
        pending_edges: VecDeque::new(),
        map,
    }
}

/// Captures a press between ticks. Edges are only consulted at the next tick
/// boundary; there is no event-driven judgment outside the tick loop.
pub fn queue_press(state: &mut State, edge: InputEdge) {
    debug!("Queued press at {:.1}ms.", edge.time_ms);
    state.pending_edges.push_back(edge);
}

pub fn is_complete(state: &State) -> bool {
    state
        .objects
        .iter()
        .all(|o| matches!(o.phase, Phase::Scored | Phase::Removed))
}

/// Advances every on-screen object for one tick. `now_ms` comes from the
/// audio clock, sampled exactly once; objects update in start-time order and
/// all judgments of the tick are returned in that order.
pub fn tick(state: &mut State, now_ms: f64, pointer: PointerState) -> Vec<JudgmentEvent> {
    let mut events = Vec::new();

    // A clock jump (seek) auto-misses whatever it skipped: queued edges are
    // stale and nothing counts as held across the gap.
    let seeking = state
        .last_tick_ms
        .is_some_and(|last| now_ms - last > SEEK_DISCONTINUITY_MS);
    if seeking {
        debug!(
            "Clock discontinuity ({:.0}ms jump); discarding {} queued edges.",
            state.last_tick_ms.map_or(0.0, |last| now_ms - last),
            state.pending_edges.len()
        );
        state.pending_edges.clear();
    }

    let edges: Vec<InputEdge> = state.pending_edges.drain(..).collect();
    for edge in edges {
        judge_press(state, now_ms, edge.position, &mut events);
    }

    let held = pointer.held && !seeking;
    for index in state.first_active..state.map.objects.len() {
        if state.map.objects[index].start_time - state.preempt > now_ms {
            break;
        }
        update_object(state, index, now_ms, pointer, held, &mut events);
    }

    while state
        .objects
        .get(state.first_active)
        .is_some_and(|o| o.phase == Phase::Removed)
    {
        state.first_active += 1;
    }

    state.last_tick_ms = Some(now_ms);
    events
}

/// Routes one press to the earliest pending object under the pointer. The
/// timing error comes from the tick's clock, not the edge timestamp.
fn judge_press(state: &mut State, now_ms: f64, position: Pos, events: &mut Vec<JudgmentEvent>) {
    for index in state.first_active..state.map.objects.len() {
        if state.map.objects[index].start_time - state.preempt > now_ms {
            return;
        }
        if state.objects[index].phase != Phase::Pending {
            continue;
        }

        let takes_press = match &state.objects[index].runtime {
            Runtime::Spinner { .. } => false,
            Runtime::Slider { head_judged, .. } => !*head_judged,
            Runtime::Circle => true,
        };
        if !takes_press {
            continue;
        }
        if position.distance(state.map.objects[index].base_pos) > state.radius {
            continue;
        }

        let delta = now_ms - state.map.objects[index].start_time;
        let tier = state.windows.tier_for(delta.abs());

        if state.map.objects[index].is_slider() {
            if let Runtime::Slider {
                head_judged, hits, ..
            } = &mut state.objects[index].runtime
            {
                *head_judged = true;
                if tier.is_hit() {
                    *hits += 1;
                }
            }
            if tier.is_hit() {
                state.score.apply_combo_independent(SCORE_SLIDER_HEAD);
            } else {
                state.score.break_combo();
            }
            events.push(JudgmentEvent {
                object_id: state.map.objects[index].id,
                kind: JudgmentEventKind::SliderHead,
                tier,
                time_delta_ms: delta,
            });
        } else {
            settle_circle(state, index, tier, delta, events);
        }
        return;
    }
}

fn settle_circle(
    state: &mut State,
    index: usize,
    tier: JudgeTier,
    delta: f64,
    events: &mut Vec<JudgmentEvent>,
) {
    state.objects[index].phase = if tier.is_hit() { Phase::Hit } else { Phase::Missed };
    state
        .score
        .apply_tier(tier, state.difficulty_multiplier, state.mod_multiplier);
    events.push(JudgmentEvent {
        object_id: state.map.objects[index].id,
        kind: JudgmentEventKind::Circle,
        tier,
        time_delta_ms: delta,
    });
    state.objects[index].phase = Phase::Scored;
}

fn update_object(
    state: &mut State,
    index: usize,
    now_ms: f64,
    pointer: PointerState,
    held: bool,
    events: &mut Vec<JudgmentEvent>,
) {
    let end_time = state.map.objects[index].end_time;

    match state.objects[index].phase {
        Phase::Scored => {
            if now_ms > end_time + state.windows.miss_horizon() {
                state.objects[index].phase = Phase::Removed;
            }
            return;
        }
        Phase::Removed => return,
        _ => {}
    }

    if state.map.objects[index].is_spinner() {
        update_spinner(state, index, now_ms, pointer, held, events);
    } else if state.map.objects[index].is_slider() {
        update_slider(state, index, now_ms, held, events);
    } else {
        let start_time = state.map.objects[index].start_time;
        if now_ms >= start_time + state.windows.miss_horizon() {
            settle_circle(state, index, JudgeTier::Miss, now_ms - start_time, events);
        }
    }
}

fn update_slider(
    state: &mut State,
    index: usize,
    now_ms: f64,
    held: bool,
    events: &mut Vec<JudgmentEvent>,
) {
    let (object_id, start_time, end_time) = {
        let object = &state.map.objects[index];
        (object.id, object.start_time, object.end_time)
    };
    let repeat_count = match &state.map.objects[index].kind {
        ProcessedKind::Slider { repeat_count, .. } => *repeat_count,
        _ => return,
    };
    let duration = end_time - start_time;

    // The head judges independently of body completion.
    let mut head_timed_out = false;
    if let Runtime::Slider { head_judged, .. } = &mut state.objects[index].runtime {
        if !*head_judged && now_ms >= start_time + state.windows.miss_horizon() {
            *head_judged = true;
            head_timed_out = true;
        }
    }
    if head_timed_out {
        state.score.break_combo();
        events.push(JudgmentEvent {
            object_id,
            kind: JudgmentEventKind::SliderHead,
            tier: JudgeTier::Miss,
            time_delta_ms: now_ms - start_time,
        });
    }

    let completion_now = if duration > 0.0 {
        ((now_ms - start_time) / duration * repeat_count as f64).clamp(0.0, repeat_count as f64)
    } else if now_ms >= start_time {
        repeat_count as f64
    } else {
        0.0
    };

    // Ticks and repeats are judged the moment the traversal crosses their
    // completion, contingent on the input being held right then.
    loop {
        let crossed = match &mut state.objects[index].runtime {
            Runtime::Slider {
                checkpoints,
                next_checkpoint,
                hits,
                ..
            } => {
                if *next_checkpoint >= checkpoints.len()
                    || checkpoints[*next_checkpoint].completion > completion_now
                {
                    None
                } else {
                    let checkpoint = checkpoints[*next_checkpoint];
                    *next_checkpoint += 1;
                    if held {
                        *hits += 1;
                    }
                    Some(checkpoint)
                }
            }
            _ => None,
        };
        let Some(checkpoint) = crossed else { break };

        let kind = match checkpoint.kind {
            CheckpointKind::Tick => JudgmentEventKind::SliderTick,
            CheckpointKind::Repeat => JudgmentEventKind::SliderRepeat,
        };
        if held {
            state.score.apply_combo_independent(match checkpoint.kind {
                CheckpointKind::Tick => SCORE_TICK,
                CheckpointKind::Repeat => SCORE_REPEAT,
            });
            events.push(JudgmentEvent {
                object_id,
                kind,
                tier: JudgeTier::Perfect,
                time_delta_ms: 0.0,
            });
        } else {
            state.score.break_combo();
            events.push(JudgmentEvent {
                object_id,
                kind,
                tier: JudgeTier::Miss,
                time_delta_ms: 0.0,
            });
        }
    }

    if now_ms < end_time {
        return;
    }

    // Traversal over: fold head/ticks/ends into the aggregate judgment.
    let (hits, total_parts) = match &state.objects[index].runtime {
        Runtime::Slider {
            hits, checkpoints, ..
        } => (*hits, 1 + checkpoints.len() as u32),
        _ => return,
    };
    let fraction = hits as f64 / total_parts as f64;
    let tier = if fraction >= 1.0 {
        JudgeTier::Perfect
    } else if fraction >= 0.5 {
        JudgeTier::Good
    } else if fraction > 0.0 {
        JudgeTier::Meh
    } else {
        JudgeTier::Miss
    };

    state.objects[index].phase = if tier.is_hit() { Phase::Hit } else { Phase::Missed };
    state
        .score
        .apply_slider_aggregate(tier, state.difficulty_multiplier, state.mod_multiplier);
    events.push(JudgmentEvent {
        object_id,
        kind: JudgmentEventKind::Slider,
        tier,
        time_delta_ms: now_ms - end_time,
    });
    state.objects[index].phase = Phase::Scored;
}

fn update_spinner(
    state: &mut State,
    index: usize,
    now_ms: f64,
    pointer: PointerState,
    held: bool,
    events: &mut Vec<JudgmentEvent>,
) {
    let (object_id, start_time, end_time) = {
        let object = &state.map.objects[index];
        (object.id, object.start_time, object.end_time)
    };
    // Rotation is always measured about the playfield center, wherever the
    // spinner object nominally sits.
    let center: Pos = cgmath::Vector2::new(PLAYFIELD_CENTER_X, PLAYFIELD_CENTER_Y);

    if now_ms >= start_time && now_ms < end_time {
        let tick_delta = state
            .last_tick_ms
            .map_or(0.0, |last| (now_ms - last.max(start_time)).max(0.0));

        if let Runtime::Spinner {
            rotations,
            last_angle,
        } = &mut state.objects[index].runtime
        {
            if held {
                let offset = pointer.position - center;
                let angle = (offset.y as f64).atan2(offset.x as f64);
                if let Some(previous) = *last_angle {
                    let mut swept = angle - previous;
                    // Shortest path: more than half a turn per tick aliases.
                    while swept > TAU / 2.0 {
                        swept -= TAU;
                    }
                    while swept < -TAU / 2.0 {
                        swept += TAU;
                    }
                    // Anti-glitch clamp: at most 5% of a turn per ms.
                    let max_turns = SPINNER_MAX_TURN_PER_MS * tick_delta;
                    *rotations += (swept.abs() / TAU).min(max_turns);
                }
                *last_angle = Some(angle);
            } else {
                *last_angle = None;
            }
        }
        return;
    }

    if now_ms < end_time {
        return;
    }

    let rotations = match &state.objects[index].runtime {
        Runtime::Spinner { rotations, .. } => *rotations,
        _ => return,
    };
    let required = required_spins(
        state.map.difficulty.overall_difficulty,
        end_time - start_time,
    );
    let ratio = rotations / required;
    let tier = if ratio >= 1.0 {
        JudgeTier::Perfect
    } else if ratio >= SPINNER_GOOD_RATIO {
        JudgeTier::Good
    } else if ratio >= SPINNER_MEH_RATIO {
        JudgeTier::Meh
    } else {
        JudgeTier::Miss
    };

    state.objects[index].phase = if tier.is_hit() { Phase::Hit } else { Phase::Missed };
    state
        .score
        .apply_tier(tier, state.difficulty_multiplier, state.mod_multiplier);
    events.push(JudgmentEvent {
        object_id,
        kind: JudgmentEventKind::Spinner,
        tier,
        time_delta_ms: now_ms - end_time,
    });
    state.objects[index].phase = Phase::Scored;
}

/// Full rotations demanded of a spinner, from OD and duration.
fn required_spins(od: f32, duration_ms: f64) -> f64 {
    let per_second = 1.5 + 0.1 * od as f64;
    ((duration_ms / 1000.0) * per_second).floor().max(1.0)
}
