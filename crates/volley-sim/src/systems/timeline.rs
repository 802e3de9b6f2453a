//! Timeline system: releases scheduled commands once their time comes.

use std::collections::VecDeque;

use volley_core::commands::ArenaCommand;
use volley_core::constants::SCHEDULE_EPSILON;

/// Commands waiting for their release time, earliest first.
#[derive(Debug, Default)]
pub struct Timeline {
    entries: VecDeque<(f64, ArenaCommand)>,
}

impl Timeline {
    /// Insert keeping time order. Equal times keep insertion order.
    pub fn schedule(&mut self, at_secs: f64, command: ArenaCommand) {
        let index = self.entries.partition_point(|(at, _)| *at <= at_secs);
        self.entries.insert(index, (at_secs, command));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Move every command due at `now` onto the command queue.
pub fn run(timeline: &mut Timeline, now: f64, queue: &mut VecDeque<ArenaCommand>) {
    while let Some((at, _)) = timeline.entries.front() {
        if *at > now + SCHEDULE_EPSILON {
            break;
        }
        if let Some((_, command)) = timeline.entries.pop_front() {
            queue.push_back(command);
        }
    }
}
