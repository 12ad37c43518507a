use crate::config::STACK_DISTANCE;
use crate::game::processing::ProcessedBeatmap;
use cgmath::MetricSpace;
use log::debug;

/// Resolves visual stack offsets for near-coincident, near-simultaneous
/// objects. Two passes over the time-ordered arena: the first walks back from
/// the end locating stack chains through circle starts and slider ends, the
/// second shifts slider-anchored chains by their position in the chain. Only
/// `stack_height` is written; timing, hit logic and the difficulty model
/// never read it. Heights are reset first, so resolving twice is a no-op.
pub fn resolve_stacks(map: &mut ProcessedBeatmap) {
    let stack_threshold = map.difficulty.preempt_ms() * map.stack_leniency as f64;
    let objects = &mut map.objects;

    for object in objects.iter_mut() {
        object.stack_height = 0;
    }

    let count = objects.len();
    if count < 2 {
        return;
    }

    for i in (1..count).rev() {
        let mut anchor = i;

        if objects[anchor].is_spinner() || objects[anchor].stack_height != 0 {
            continue;
        }

        if objects[anchor].is_slider() {
            // Sliders only chain backwards through whatever ends under their
            // start point.
            let mut n = anchor;
            while n > 0 {
                n -= 1;
                if objects[n].is_spinner() {
                    continue;
                }
                if objects[anchor].start_time - objects[n].start_time > stack_threshold {
                    break;
                }
                if objects[n]
                    .base_end_pos
                    .distance(objects[anchor].base_pos)
                    < STACK_DISTANCE
                {
                    objects[n].stack_height = objects[anchor].stack_height + 1;
                    anchor = n;
                }
            }
            continue;
        }

        // Circle: chain backwards through coincident starts; a slider whose
        // end touches the chain shifts the already-stacked run instead of
        // joining it.
        let mut n = anchor;
        while n > 0 {
            n -= 1;
            if objects[n].is_spinner() {
                continue;
            }
            if objects[anchor].start_time - objects[n].end_time > stack_threshold {
                break;
            }

            if objects[n].is_slider()
                && objects[n].base_end_pos.distance(objects[anchor].base_pos) < STACK_DISTANCE
            {
                let offset = objects[anchor].stack_height - objects[n].stack_height + 1;
                for j in (n + 1)..=i {
                    if objects[n].base_end_pos.distance(objects[j].base_pos) < STACK_DISTANCE {
                        objects[j].stack_height -= offset;
                    }
                }
                break;
            }

            if objects[n].base_pos.distance(objects[anchor].base_pos) < STACK_DISTANCE {
                objects[n].stack_height = objects[anchor].stack_height + 1;
                anchor = n;
            }
        }
    }

    debug!(
        "Stacking resolved; {} objects carry a non-zero stack height.",
        objects.iter().filter(|o| o.stack_height != 0).count()
    );
}
