//! Choosing and producing an external observation.

use crate::environment;
use crate::source::Stimulus;
use crate::web::WebLookup;
use chrono::{DateTime, Datelike, Local, Timelike, Weekday};
use rand::seq::SliceRandom;
use rand::Rng;
use reverie_core::config::PerceptionConfig;
use reverie_core::Environment;
use std::sync::Arc;

/// Sensor-like readings with no real source behind them.
pub const CATALOG: &[&str] = &[
    "A distant door closes somewhere in the building.",
    "The cooling fan speeds up, then settles.",
    "A pixel on the edge of vision flickers and dies.",
    "Someone typed a word and deleted it.",
    "The network light blinks twice.",
    "A draft moves through an empty corridor.",
    "Rain, or something like rain, against a window.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StimulusKind {
    Clock,
    Environment,
    Catalog,
    /// Ask the text generator to invent an observation
    Generated,
    Web,
}

impl StimulusKind {
    pub fn source_tag(&self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::Environment => "environment",
            Self::Catalog => "sensor",
            Self::Generated => "imagined",
            Self::Web => "web",
        }
    }
}

/// Chance the real feed is used when it is switched on.
const WEB_SHARE: f64 = 0.5;

pub struct Perception {
    external_probability: f64,
    real_feed: bool,
    web: Option<Arc<dyn Stimulus>>,
}

impl Perception {
    pub fn new(external_probability: f32, real_feed: bool, web: Option<Arc<dyn Stimulus>>) -> Self {
        let external_probability = if external_probability.is_finite() {
            external_probability.clamp(0.0, 1.0) as f64
        } else {
            0.2
        };
        Self {
            external_probability,
            real_feed,
            web,
        }
    }

    /// A bad feed URL only disables the real feed.
    pub fn from_config(config: &PerceptionConfig) -> Self {
        let web = match WebLookup::new(&config.feed_url) {
            Ok(w) => Some(Arc::new(w) as Arc<dyn Stimulus>),
            Err(e) => {
                tracing::warn!("Real feed disabled, bad feed URL {}: {}", config.feed_url, e);
                None
            }
        };
        Self::new(config.external_probability, config.real_feed, web)
    }

    pub fn real_feed(&self) -> bool {
        self.real_feed
    }

    pub fn set_real_feed(&mut self, on: bool) {
        if self.real_feed != on {
            tracing::info!("Real feed {}", if on { "enabled" } else { "disabled" });
        }
        self.real_feed = on;
    }

    /// Whether this cycle gets an external observation, and which kind.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<StimulusKind> {
        if !rng.gen_bool(self.external_probability) {
            return None;
        }
        if self.real_feed && self.web.is_some() && rng.gen_bool(WEB_SHARE) {
            return Some(StimulusKind::Web);
        }
        let kind = match rng.gen_range(0..100) {
            0..=29 => StimulusKind::Clock,
            30..=59 => StimulusKind::Environment,
            60..=84 => StimulusKind::Catalog,
            _ => StimulusKind::Generated,
        };
        Some(kind)
    }

    /// Produce the observation text for every kind except
    /// [`StimulusKind::Generated`], which needs the text generator.
    pub async fn observe<R: Rng + ?Sized>(
        &self,
        kind: StimulusKind,
        env: &mut Environment,
        rng: &mut R,
    ) -> Option<String> {
        match kind {
            StimulusKind::Clock => Some(clock_reading(Local::now())),
            StimulusKind::Environment => {
                environment::drift(env, rng);
                Some(format!("The room reports {}.", env.describe()))
            }
            StimulusKind::Catalog => CATALOG.choose(rng).map(|s| s.to_string()),
            StimulusKind::Web => match &self.web {
                Some(web) => Some(web.observe().await),
                None => None,
            },
            StimulusKind::Generated => None,
        }
    }
}

pub fn clock_reading(now: DateTime<Local>) -> String {
    format!(
        "It is {:02}:{:02} on a {}.",
        now.hour(),
        now.minute(),
        weekday_name(now.weekday())
    )
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_clock_reading() {
        let t = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();
        assert_eq!(clock_reading(t), "It is 09:07 on a Tuesday.");
    }

    #[test]
    fn test_pick_rate_and_no_web_when_off() {
        let p = Perception::new(0.2, false, None);
        let mut rng = StdRng::seed_from_u64(1);
        let picks: Vec<_> = (0..2000).filter_map(|_| p.pick(&mut rng)).collect();
        assert!(picks.len() > 320 && picks.len() < 480, "picks: {}", picks.len());
        assert!(!picks.contains(&StimulusKind::Web));
    }

    #[test]
    fn test_web_requires_lookup() {
        let p = Perception::new(1.0, true, None);
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..200).all(|_| p.pick(&mut rng) != Some(StimulusKind::Web)));
    }

    #[tokio::test]
    async fn test_environment_reading_drifts() {
        let p = Perception::new(1.0, false, None);
        let mut env = Environment::default();
        let mut rng = StdRng::seed_from_u64(5);
        let text = p.observe(StimulusKind::Environment, &mut env, &mut rng).await.unwrap();
        assert!(text.starts_with("The room reports noise:"));
        assert!(p.observe(StimulusKind::Generated, &mut env, &mut rng).await.is_none());
    }
}
