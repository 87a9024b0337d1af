//! Simulated surroundings.
//!
//! The environment drifts a little on every reading and reacts to what the
//! mind thinks about: a thought about silence quiets the room, a thought
//! about darkness dims it.

use rand::Rng;
use reverie_core::Environment;

const TEMPERATURE_RANGE: (f32, f32) = (14.0, 28.0);

enum Shift {
    Noise(&'static str),
    Light(&'static str),
    Warmer(f32),
}

const TRIGGERS: &[(&[&str], Shift)] = &[
    (&["silence", "quiet", "still"], Shift::Noise("near silence")),
    (&["noise", "static", "loud", "hum"], Shift::Noise("a crackle of static")),
    (&["dark", "shadow", "night"], Shift::Light("dark")),
    (&["light", "bright", "sun", "glow"], Shift::Light("flickering")),
    (&["cold", "frost", "ice"], Shift::Warmer(-1.0)),
    (&["warm", "heat", "fire"], Shift::Warmer(1.0)),
];

/// Flip descriptors for every trigger whose word appears in `thought`.
/// Returns whether anything changed.
pub fn react(env: &mut Environment, thought: &str) -> bool {
    let lower = thought.to_lowercase();
    let before = env.clone();
    for (words, shift) in TRIGGERS {
        if !words.iter().any(|w| lower.contains(w)) {
            continue;
        }
        match shift {
            Shift::Noise(n) => env.noise = n.to_string(),
            Shift::Light(l) => env.light = l.to_string(),
            Shift::Warmer(d) => env.temperature_c += d,
        }
    }
    clamp_temperature(env);
    let changed = *env != before;
    if changed {
        tracing::debug!("Environment shifted: {}", env.describe());
    }
    changed
}

/// Small random wander of the temperature.
pub fn drift<R: Rng + ?Sized>(env: &mut Environment, rng: &mut R) {
    env.temperature_c += rng.gen_range(-0.5..=0.5);
    clamp_temperature(env);
}

fn clamp_temperature(env: &mut Environment) {
    env.temperature_c = if env.temperature_c.is_finite() {
        env.temperature_c.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1)
    } else {
        Environment::default().temperature_c
    };
}
