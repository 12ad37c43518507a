use crate::core::clock::ManualClock;
use crate::core::input::QueuedInput;
use crate::core::samples::{HitSoundKind, SampleBank, SampleHandle, SampleSet, hit_sounds_for};
use crate::difficulty::DifficultyAttributes;
use crate::game::processing::{ProcessedBeatmap, ProcessedKind};
use crate::game::session::GameplaySession;
use log::{LevelFilter, error, info};
use serde::Serialize;
use std::error::Error;
use std::f64::consts::TAU;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod core;
mod difficulty;
mod game;
mod parsing;

#[derive(Serialize)]
struct Summary {
    title: String,
    artist: String,
    creator: String,
    version: String,
    circles: usize,
    sliders: usize,
    spinners: usize,
    breaks: usize,
    max_combo: u32,
    difficulty: DifficultyAttributes,
}

fn usage() -> &'static str {
    "usage: circlesync <beatmap.osu> [--json] [--rate <clock rate>] [--simulate]"
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("circlesync::parsing", LevelFilter::Debug)
        .init();

    let mut path: Option<PathBuf> = None;
    let mut as_json = false;
    let mut simulate_play = false;
    let mut clock_rate = 1.0f64;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => as_json = true,
            "--simulate" => simulate_play = true,
            "--rate" => {
                let value = args.next().ok_or(usage())?;
                clock_rate = value.parse::<f64>().map_err(|_| usage())?;
                if !clock_rate.is_finite() || clock_rate <= 0.0 {
                    return Err(usage().into());
                }
            }
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            _ => return Err(usage().into()),
        }
    }
    let Some(path) = path else {
        return Err(usage().into());
    };

    let text = std::fs::read_to_string(&path)
        .or_else(|_| std::fs::read(&path).map(|b| b.iter().map(|&b| b as char).collect()))?;
    // The whole load pipeline runs as one unit of work on a worker thread;
    // the result comes back over a channel.
    let loaded = match crate::core::loader::load_beatmap_async(text).recv()? {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to parse {:?}: {}", path, e);
            return Err(e.to_string().into());
        }
    };
    let attributes = if clock_rate == 1.0 {
        loaded.difficulty
    } else {
        difficulty::calculate_with_clock_rate(&loaded.processed, clock_rate)
    };

    let mut circles = 0;
    let mut sliders = 0;
    let mut spinners = 0;
    for object in &loaded.processed.objects {
        match object.kind {
            ProcessedKind::Circle => circles += 1,
            ProcessedKind::Slider { .. } => sliders += 1,
            ProcessedKind::Spinner => spinners += 1,
        }
    }

    let summary = Summary {
        title: loaded.beatmap.title.clone(),
        artist: loaded.beatmap.artist.clone(),
        creator: loaded.beatmap.creator.clone(),
        version: loaded.beatmap.version.clone(),
        circles,
        sliders,
        spinners,
        breaks: loaded.processed.breaks.len(),
        max_combo: loaded.processed.max_combo(),
        difficulty: attributes,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} - {} [{}] by {}",
            summary.artist, summary.title, summary.version, summary.creator
        );
        println!(
            "  {} circles, {} sliders, {} spinners (max combo x{})",
            summary.circles, summary.sliders, summary.spinners, summary.max_combo
        );
        println!(
            "  aim {:.3} | speed {:.3} | {:.2} stars",
            attributes.aim_strain, attributes.speed_strain, attributes.star_rating
        );
    }

    if simulate_play {
        autoplay(loaded.processed.clone());
    }

    info!("Done.");
    Ok(())
}

/// Resolves every sample request to a synthetic handle, standing in for the
/// audio collaborator during headless runs.
struct EchoBank;

impl SampleBank for EchoBank {
    fn resolve(&self, set: SampleSet, kind: HitSoundKind) -> Option<SampleHandle> {
        Some(SampleHandle(set.id() as u32 * 16 + kind as u32))
    }
}

/// Drives a full play through the judgment engine with scripted perfect
/// input, the way a frame scheduler would: one tick per 16ms of audio time.
fn autoplay(processed: Arc<ProcessedBeatmap>) {
    let Some(last) = processed.objects.last() else {
        println!("  autoplay: nothing to play");
        return;
    };
    let end = last.end_time + 200.0;
    let mut session =
        GameplaySession::new(processed, ManualClock::new(), QueuedInput::new(), 1.0);

    let bank = EchoBank;
    let mut next_press = 0usize;
    let mut samples_triggered = 0usize;
    let mut judged = 0usize;

    let mut now = 0.0f64;
    while now <= end {
        // Press each object at the first tick at or past its start time,
        // aimed where the object is actually drawn.
        let mut presses: Vec<crate::parsing::beatmap::Pos> = Vec::new();
        while let Some(target) = session.map().objects.get(next_press) {
            if target.start_time > now {
                break;
            }
            if !target.is_spinner() {
                presses.push(target.stacked_pos());
            }
            next_press += 1;
        }
        for position in presses {
            session.input_mut().press(position, now);
        }

        // Between presses the pointer follows whatever is active: the slider
        // ball while a slider runs, a circling path while a spinner runs.
        let pointer = session.map().objects.iter().find_map(|object| {
            if now < object.start_time || now >= object.end_time {
                return None;
            }
            if object.is_spinner() {
                let angle = (now / 16.0 * 0.05 * TAU) % TAU;
                Some(cgmath::Vector2::new(
                    config::PLAYFIELD_CENTER_X + 100.0 * angle.cos() as f32,
                    config::PLAYFIELD_CENTER_Y + 100.0 * angle.sin() as f32,
                ))
            } else if let ProcessedKind::Slider { repeat_count, .. } = &object.kind {
                let duration = object.duration();
                if duration <= 0.0 {
                    return Some(object.stacked_end_pos());
                }
                let completion = (now - object.start_time) / duration * *repeat_count as f64;
                Some(object.stacked_position_at(completion))
            } else {
                None
            }
        });
        if let Some(position) = pointer {
            session.input_mut().set_pointer(position, true);
        }

        session.clock_mut().set_ms(now);
        for event in session.tick() {
            if event.tier.is_hit() {
                let info = session.map().objects[event.object_id].hit_sound;
                samples_triggered += hit_sounds_for(&bank, &info).len();
            }
            judged += 1;
        }

        if session.is_complete() {
            break;
        }
        now += 16.0;
    }

    let score = session.score();
    println!(
        "  autoplay: score {} | combo x{} | accuracy {:.2}% | {} judgments | {} samples",
        score.score,
        score.max_combo,
        score.accuracy() * 100.0,
        judged,
        samples_triggered
    );
}
