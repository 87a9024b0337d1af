//! Emotional gradient dynamics.
//!
//! Once per cycle every weight decays, occasionally one emotion is excited,
//! and the vector is renormalized. High tension makes excitation both more
//! likely and more likely to land on anxiety.

use rand::Rng;
use reverie_core::{Emotion, EmotionVector};

#[derive(Debug, Clone)]
pub struct PerturbConfig {
    /// Multiplier applied to every weight each cycle
    pub decay: f32,
    /// Excitation probability at zero tension
    pub base_chance: f32,
    /// Extra excitation probability per unit of tension
    pub tension_gain: f32,
    /// Amount added to the excited emotion
    pub kick: f32,
    /// Above this tension, half of all excitations are forced onto anxiety
    pub anxiety_tension: f32,
}

impl Default for PerturbConfig {
    fn default() -> Self {
        Self {
            decay: 0.95,
            base_chance: 0.2,
            tension_gain: 0.3,
            kick: 0.1,
            anxiety_tension: 0.5,
        }
    }
}

/// Perturb the gradient with the default constants. Returns the excited
/// emotion, if any.
pub fn perturb<R: Rng + ?Sized>(
    gradient: &mut EmotionVector,
    tension: f32,
    rng: &mut R,
) -> Option<Emotion> {
    perturb_with(gradient, tension, &PerturbConfig::default(), rng)
}

pub fn perturb_with<R: Rng + ?Sized>(
    gradient: &mut EmotionVector,
    tension: f32,
    config: &PerturbConfig,
    rng: &mut R,
) -> Option<Emotion> {
    let tension = tension.clamp(0.0, 1.0);
    gradient.scale(config.decay);

    let chance = config.base_chance + config.tension_gain * tension;
    let excited = if rng.gen::<f32>() < chance {
        let emotion = if tension > config.anxiety_tension && rng.gen_bool(0.5) {
            Emotion::Anxiety
        } else {
            Emotion::ALL[rng.gen_range(0..Emotion::ALL.len())]
        };
        gradient.add_raw(emotion, config.kick);
        Some(emotion)
    } else {
        None
    };

    gradient.normalize();
    if let Some(e) = excited {
        tracing::trace!("Emotion perturbed: +{:.2} {}", config.kick, e);
    }
    excited
}
