use crate::difficulty::{self, DifficultyAttributes};
use crate::game::processing::{self, ProcessedBeatmap};
use crate::game::stacking;
use crate::parsing::beatmap::{self, Beatmap, ParseError};
use log::{info, warn};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, channel};
use std::thread;

/// Everything the load pipeline produces for one beatmap.
pub struct LoadedBeatmap {
    pub beatmap: Arc<Beatmap>,
    pub processed: Arc<ProcessedBeatmap>,
    pub difficulty: DifficultyAttributes,
}

pub type LoadOutcome = Result<LoadedBeatmap, ParseError>;

/// Runs the whole load pipeline synchronously:
/// text → Beatmap → ProcessedBeatmap (stacked) → DifficultyAttributes.
pub fn load_beatmap(text: &str) -> LoadOutcome {
    let beatmap = beatmap::parse_beatmap_str(text)?;
    let mut processed = processing::process(&beatmap);
    stacking::resolve_stacks(&mut processed);
    let difficulty = difficulty::calculate(&processed);

    info!(
        "Loaded '{}' [{}]: {} objects, {:.2} stars.",
        beatmap.title,
        beatmap.version,
        processed.objects.len(),
        difficulty.star_rating
    );

    Ok(LoadedBeatmap {
        beatmap: Arc::new(beatmap),
        processed: Arc::new(processed),
        difficulty,
    })
}

/// Offloads `load_beatmap` to a worker thread. The pipeline is a pure
/// function of the text, so any number of loads may run in parallel (e.g.
/// precomputing a song list's difficulties); results are message-passed
/// back, nothing is shared.
pub fn load_beatmap_async(text: String) -> Receiver<LoadOutcome> {
    let (sender, receiver) = channel();
    let spawned = thread::Builder::new()
        .name("beatmap-loader".into())
        .spawn(move || {
            if sender.send(load_beatmap(&text)).is_err() {
                warn!("Beatmap load finished after its receiver was dropped.");
            }
        });
    if let Err(e) = spawned {
        warn!("Failed to spawn beatmap loader thread: {}", e);
    }
    receiver
}
