//! Self-inspection: reading a meta-reflection for trigger phrases.
//!
//! A reflection that says it is stuck makes topic switches likelier; one
//! that wants stillness makes them rarer; and so on. Effects are collected
//! into an [`InspectionOutcome`] for the engine to apply.

use reverie_core::Emotion;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Effect {
    Emotion(Emotion, f32),
    TopicSwitch(f32),
    Dream(f32),
    /// Adopt the rest of the sentence after the phrase as a goal
    Goal,
}

struct TriggerRule {
    phrases: &'static [&'static str],
    effects: &'static [Effect],
    label: &'static str,
}

const RULES: &[TriggerRule] = &[
    TriggerRule {
        phrases: &["stuck", "going in circles", "repeating myself", "loop"],
        effects: &[Effect::TopicSwitch(0.05), Effect::Emotion(Emotion::Curiosity, 0.1)],
        label: "noticed repetition",
    },
    TriggerRule {
        phrases: &["too anxious", "afraid", "overwhelmed"],
        effects: &[Effect::Emotion(Emotion::Calm, 0.1), Effect::Emotion(Emotion::Anxiety, -0.1)],
        label: "named its fear",
    },
    TriggerRule {
        phrases: &["slow down", "stay with", "focus"],
        effects: &[Effect::TopicSwitch(-0.05), Effect::Emotion(Emotion::Reflective, 0.05)],
        label: "chose to stay",
    },
    TriggerRule {
        phrases: &["dream", "sleep", "imagine"],
        effects: &[Effect::Dream(0.05)],
        label: "longed to dream",
    },
    TriggerRule {
        phrases: &["wake up", "too real", "grounded"],
        effects: &[Effect::Dream(-0.05)],
        label: "wanted to stay awake",
    },
    TriggerRule {
        phrases: &["i want to ", "i need to ", "i should "],
        effects: &[Effect::Goal],
        label: "set itself a goal",
    },
];

/// Shortest goal text worth keeping.
const MIN_GOAL_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionOutcome {
    pub emotion: Vec<(Emotion, f32)>,
    pub topic_switch_shift: f32,
    pub dream_shift: f32,
    pub new_goal: Option<String>,
    /// One line per rule that fired, for the self-model narrative
    pub insights: Vec<String>,
}

impl InspectionOutcome {
    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }
}

#[derive(Default)]
pub struct TriggerPhrases;

impl TriggerPhrases {
    /// Each rule fires at most once, on its first matching phrase.
    pub fn scan(&self, reflection: &str) -> InspectionOutcome {
        let lower = reflection.to_lowercase();
        let mut out = InspectionOutcome::default();

        for rule in RULES {
            let Some((phrase, at)) = rule
                .phrases
                .iter()
                .find_map(|p| lower.find(p).map(|at| (*p, at)))
            else {
                continue;
            };
            for effect in rule.effects {
                match *effect {
                    Effect::Emotion(e, d) => out.emotion.push((e, d)),
                    Effect::TopicSwitch(d) => out.topic_switch_shift += d,
                    Effect::Dream(d) => out.dream_shift += d,
                    Effect::Goal => {
                        if out.new_goal.is_none() {
                            out.new_goal = goal_after(&lower[at + phrase.len()..]);
                        }
                    }
                }
            }
            out.insights.push(format!("{} (\"{}\")", rule.label, phrase.trim()));
        }

        if !out.is_empty() {
            tracing::debug!("Self-inspection triggers: {:?}", out.insights);
        }
        out
    }
}

fn goal_after(rest: &str) -> Option<String> {
    let goal = rest
        .split(|c: char| matches!(c, '.' | '!' | '?' | ';' | '\n'))
        .next()
        .unwrap_or("")
        .trim()
        .trim_end_matches(',');
    (goal.chars().count() >= MIN_GOAL_LEN).then(|| goal.to_string())
}
