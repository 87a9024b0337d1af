//! Terminal rendering of mind snapshots.
//!
//! The renderer only reads snapshots. It prints one block per finished
//! cycle and one line per aside that lands between cycles.

use reverie_core::text::clip;
use reverie_reasoning::MindSnapshot;
use std::fmt::Write;

const LINE_WIDTH: usize = 100;

#[derive(Debug, Default)]
pub struct Renderer {
    cycles: u64,
    stream_tail: Option<String>,
    last_error: Option<String>,
    real_feed: Option<bool>,
}

impl Renderer {
    /// Text for whatever changed since the previous snapshot, if anything.
    pub fn render(&mut self, snapshot: &MindSnapshot) -> Option<String> {
        let mut out = String::new();
        let tail = snapshot.mind.state.stream.back().cloned();

        if self.real_feed.is_some_and(|on| on != snapshot.real_feed) {
            let _ = writeln!(
                out,
                "  (real feed {})",
                if snapshot.real_feed { "on" } else { "off" }
            );
        }
        self.real_feed = Some(snapshot.real_feed);

        if snapshot.cycles > self.cycles {
            self.cycles = snapshot.cycles;
            out.push_str(&cycle_block(snapshot));
        } else if tail.is_some() && tail != self.stream_tail {
            if let Some(t) = &tail {
                let _ = writeln!(out, "  ~ {}", clip(t, LINE_WIDTH));
            }
        }
        self.stream_tail = tail;

        if snapshot.last_error.is_some() && snapshot.last_error != self.last_error {
            if let Some(e) = &snapshot.last_error {
                let _ = writeln!(out, "  ! {}", e);
            }
        }
        self.last_error = snapshot.last_error.clone();

        (!out.is_empty()).then_some(out)
    }
}

fn cycle_block(snapshot: &MindSnapshot) -> String {
    let mind = &snapshot.mind;
    let pulse = if snapshot.pulse { "●" } else { "○" };
    let kind = snapshot
        .last_cycle
        .map(|k| k.to_string())
        .unwrap_or_else(|| "idle".to_string());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} [{}] cycle {} · {} · {} · topic: {}",
        pulse,
        chrono::Local::now().format("%H:%M:%S"),
        snapshot.cycles,
        kind,
        snapshot.persona,
        mind.topic
    );
    let _ = writeln!(
        out,
        "  mood: {} | tension {:.2} | maturity {:.3}",
        mind.emotions.describe(),
        mind.state.tension.get(),
        mind.maturity.get()
    );
    if let Some(newest) = mind.memory.newest() {
        let _ = writeln!(out, "  » {}", clip(&newest.text, LINE_WIDTH));
    }
    let _ = writeln!(out, "  attention: {}", mind.state.attention.describe());
    if !mind.state.concerns.conflicts.is_empty() {
        let conflicts: Vec<&str> = mind.state.concerns.conflicts.iter().map(String::as_str).collect();
        let _ = writeln!(out, "  conflicts: {}", conflicts.join("; "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_core::{Emotion, MemoryFragment};
    use reverie_reasoning::{CycleKind, Mind};

    fn snapshot(cycles: u64) -> MindSnapshot {
        let mut mind = Mind::default();
        mind.memory.push(MemoryFragment::new("the lamp hums", Emotion::Calm, 1.0), 0.9);
        mind.state.push_stream("the lamp hums");
        MindSnapshot {
            mind,
            pulse: cycles % 2 == 1,
            cycles,
            last_cycle: Some(CycleKind::Normal),
            last_error: None,
            persona: "Logician".to_string(),
            real_feed: false,
        }
    }

    #[test]
    fn test_new_cycle_renders_block() {
        let mut r = Renderer::default();
        let out = r.render(&snapshot(1)).unwrap();
        assert!(out.contains("cycle 1 · normal · Logician · topic: memory"));
        assert!(out.contains("» the lamp hums"));
    }

    #[test]
    fn test_unchanged_snapshot_renders_nothing() {
        let mut r = Renderer::default();
        r.render(&snapshot(1));
        assert!(r.render(&snapshot(1)).is_none());
    }

    #[test]
    fn test_aside_between_cycles() {
        let mut r = Renderer::default();
        let mut s = snapshot(1);
        r.render(&s);
        s.mind.state.push_stream("You are not alone.");
        assert_eq!(r.render(&s).as_deref(), Some("  ~ You are not alone.\n"));
    }

    #[test]
    fn test_error_shown_once() {
        let mut r = Renderer::default();
        let mut s = snapshot(1);
        s.last_error = Some("[generation error] transport failure: timed out".to_string());
        assert!(r.render(&s).unwrap().contains("! [generation error]"));
        s.cycles = 2;
        assert!(!r.render(&s).unwrap().contains("! "));
    }

    #[test]
    fn test_feed_toggle_noted() {
        let mut r = Renderer::default();
        let mut s = snapshot(1);
        r.render(&s);
        s.real_feed = true;
        assert_eq!(r.render(&s).as_deref(), Some("  (real feed on)\n"));
    }
}
