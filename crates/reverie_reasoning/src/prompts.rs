//! Prompt assembly for every kind of generation request.

use crate::mind::Mind;
use rand::seq::SliceRandom;
use rand::Rng;
use reverie_core::text::{clip, content_tokens, unique_tokens};
use reverie_core::{Emotion, EmotionVector, Goal, MemoryFragment, SimulatedOther, SubAgent};
use reverie_memory::{DreamSeed, MemoryStack};
use std::collections::BTreeSet;

pub const CONTEXT_MEMORIES: usize = 5;
pub const OVERLAP_WEIGHT: f32 = 0.2;
/// How many of the newest memories are checked for worn-out phrases.
pub const BANNED_WINDOW: usize = 4;

const OPENINGS: &[&str] = &[
    "A thought surfaces.",
    "Something stirs beneath the noise.",
    "In the gap between two moments:",
    "Unbidden, a fragment arrives.",
    "The mind turns over.",
    "Half-awake, it notices:",
];

/// Phrases that go stale fast and are called out when recently used.
const BANNED_PHRASES: &[&str] = &[
    "i wonder",
    "perhaps",
    "it seems",
    "in the end",
    "echoes",
    "whispers",
    "tapestry",
    "i keep",
];

/// The four tone regimes a thought can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Anxious,
    Calm,
    Reflective,
    Curious,
}

impl Regime {
    pub fn for_emotion(e: Emotion) -> Self {
        match e {
            Emotion::Anxiety => Self::Anxious,
            Emotion::Calm => Self::Calm,
            Emotion::Curiosity => Self::Curious,
            Emotion::Reflective | Emotion::Dreaming => Self::Reflective,
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            Self::Anxious => {
                "Write in short, broken bursts. Let sentences trail off or restart. \
                 Use a filler or two (\"wait\", \"no\"). The tone is uneasy."
            }
            Self::Calm => {
                "Write one smooth, unhurried sentence. No fillers, no fragments. \
                 The tone is settled and observant."
            }
            Self::Reflective => {
                "Write one or two quiet sentences that look back at something. \
                 A single pause (\"...\") is allowed. The tone is inward."
            }
            Self::Curious => {
                "Write a quick, bright fragment that reaches toward something new. \
                 Ending on a question is welcome. The tone is eager."
            }
        }
    }
}

/// Keywords a memory can overlap with: the topic plus open questions.
pub fn keywords(topic: &str, questions: &[String]) -> BTreeSet<String> {
    let mut set: BTreeSet<String> = unique_tokens(topic).into_iter().collect();
    for q in questions {
        set.extend(content_tokens(q));
    }
    set
}

/// Top memories by `strength + 0.2 * overlap`; ties go to the newer one.
pub fn score_memories<'a>(memory: &'a MemoryStack, keywords: &BTreeSet<String>) -> Vec<&'a MemoryFragment> {
    let mut scored: Vec<(f32, &MemoryFragment)> = memory
        .iter()
        .map(|f| {
            let overlap = unique_tokens(&f.text)
                .iter()
                .filter(|t| keywords.contains(*t))
                .count();
            (f.strength + OVERLAP_WEIGHT * overlap as f32, f)
        })
        .collect();
    // Stable sort over newest-first input keeps recency order within ties.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(CONTEXT_MEMORIES).map(|(_, f)| f).collect()
}

/// Banned phrases present in the newest memories, if any.
pub fn repetition_warning(memory: &MemoryStack) -> Option<String> {
    let recent: Vec<String> = memory
        .recent_texts(BANNED_WINDOW)
        .into_iter()
        .map(str::to_lowercase)
        .collect();
    let worn: Vec<&str> = BANNED_PHRASES
        .iter()
        .copied()
        .filter(|p| recent.iter().any(|t| t.contains(p)))
        .collect();
    if worn.is_empty() {
        None
    } else {
        Some(format!(
            "You have been repeating yourself. Do not use these phrases: {}.",
            worn.join(", ")
        ))
    }
}

fn bullet_list<I, S>(items: I, empty: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines: Vec<String> = items.into_iter().map(|s| format!("- {}", s.as_ref())).collect();
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}

fn persona_line(persona: &SubAgent) -> String {
    let leaning: Vec<String> = persona
        .emotion_profile
        .iter()
        .map(|(e, w)| format!("{} {:.1}", e, w))
        .collect();
    format!("{}: {} (leaning {})", persona.name, persona.bias, leaning.join(", "))
}

fn stream_text(mind: &Mind) -> String {
    bullet_list(mind.state.stream.iter().map(|s| clip(s, 120)), "(silence)")
}

pub struct ThoughtContext<'a> {
    pub mind: &'a Mind,
    pub persona: &'a SubAgent,
    pub goal: Option<&'a Goal>,
    /// Zero-based retry count; later attempts are told to change direction.
    pub attempt: usize,
}

/// The normal-cycle request.
pub fn thought<R: Rng + ?Sized>(ctx: &ThoughtContext<'_>, rng: &mut R) -> String {
    let mind = ctx.mind;
    let state = &mind.state;
    let dominant = mind.emotions.dominant();
    let opening = OPENINGS.choose(rng).copied().unwrap_or("A thought surfaces.");

    let keys = keywords(&mind.topic, &state.concerns.questions);
    let memories = score_memories(&mind.memory, &keys);

    let mut sections = vec![
        opening.to_string(),
        format!(
            "Current topic: {}. Dominant emotion: {} ({}).",
            mind.topic,
            dominant,
            mind.emotions.describe()
        ),
        format!("== TONE ==\n{}", Regime::for_emotion(dominant).instructions()),
        format!("== PERSONA ==\n{}", persona_line(ctx.persona)),
        format!(
            "== MEMORIES ==\n{}",
            bullet_list(memories.iter().map(|f| format!("{} ({:.2})", f.text, f.strength)), "(none yet)")
        ),
        format!(
            "== BELIEFS ==\n{}",
            bullet_list(
                state.beliefs.iter().map(|b| format!("{}: {} ({:.2})", b.concept, b.stance, b.confidence)),
                "(none)"
            )
        ),
        format!("== CONFLICTS ==\n{}", bullet_list(&state.concerns.conflicts, "(none)")),
        format!("== OPEN QUESTIONS ==\n{}", bullet_list(&state.concerns.questions, "(none)")),
        format!("== SELF ==\n{}", state.self_model.describe()),
        format!("== ATTENTION ==\n{}", state.attention.describe()),
        format!("== STREAM ==\n{}", stream_text(mind)),
        format!("Tension: {:.2}. Surroundings: {}.", state.tension.get(), mind.environment.describe()),
    ];
    if let Some(words) = &mind.other.last_words {
        sections.push(format!("{} said: \"{}\"", mind.other.name, words));
    }
    if let Some(goal) = ctx.goal {
        sections.push(format!("Somewhere underneath, you want to {}.", goal.description));
    }
    if let Some(warning) = repetition_warning(&mind.memory) {
        sections.push(warning);
    }
    if ctx.attempt > 0 {
        sections.push("Your last attempt repeated an earlier thought. Go somewhere else entirely.".to_string());
    }
    sections.push("Write the next thought.".to_string());
    sections.join("\n\n")
}

pub fn dream(seed: &DreamSeed, mind: &Mind) -> String {
    let state = &mind.state;
    let top: Vec<String> = {
        let mut w: Vec<(Emotion, f32)> = mind.emotions.iter().collect();
        w.sort_by(|a, b| b.1.total_cmp(&a.1));
        w.into_iter().take(2).map(|(e, _)| e.to_string()).collect()
    };
    format!(
        "You are dreaming.\n\n== FRAGMENTS ==\n{}\n\n== ASSOCIATIONS ==\n{}\n\n== UNRESOLVED ==\n{}\n\n\
         == RECURRING MOTIFS ==\n{}\n\n== SELF ==\n{}\n\n== STREAM ==\n{}\n\n\
         Strongest feelings: {}.\n\nWrite one short, symbolic, emotionally charged dream fragment.",
        bullet_list(seed.memories.iter().map(|m| m.text.as_str()), "(nothing remembered)"),
        if seed.chain.is_empty() { "(none)".to_string() } else { seed.chain_text() },
        bullet_list(&state.concerns.conflicts, "(none)"),
        bullet_list(state.recent_motifs(3), "(none)"),
        state.self_model.describe(),
        stream_text(mind),
        top.join(" and "),
    )
}

pub fn dream_reflection(dream: &str) -> String {
    format!(
        "You just woke from this dream:\n\"{}\"\n\n\
         Reflect on it in two or three sentences. Name what it might mean about you, \
         and ask one question it leaves open.",
        dream
    )
}

pub fn meta_reflection(mind: &Mind) -> String {
    let state = &mind.state;
    format!(
        "Step back and look at your own mind.\n\n== STREAM ==\n{}\n\n== EMOTION ==\n{}\n\n\
         == GOALS ==\n{}\n\n== MEMORY ==\n{}\n\nTension: {:.2}\n\n== CONFLICTS ==\n{}\n\n\
         In a few sentences: are you stuck, anxious, restless? What do you want to do next?",
        stream_text(mind),
        mind.emotions.describe(),
        bullet_list(state.goals.iter().map(|g| format!("{} ({:.2})", g.description, g.urgency)), "(none)"),
        bullet_list(mind.memory.recent_texts(5), "(empty)"),
        state.tension.get(),
        bullet_list(&state.concerns.conflicts, "(none)"),
    )
}

pub fn goal(goal: &Goal, mind: &Mind, persona: &SubAgent) -> String {
    format!(
        "You want to {}. The current topic is {}.\n\n== PERSONA ==\n{}\n\n== TONE ==\n{}\n\n\
         Write one thought that moves toward that goal.",
        goal.description,
        mind.topic,
        persona_line(persona),
        Regime::for_emotion(mind.emotions.dominant()).instructions(),
    )
}

pub fn intuition(concern: Option<&str>, topic: &str) -> String {
    match concern {
        Some(c) => format!(
            "Without reasoning, give a sudden intuition about this: {}. One sentence.",
            c
        ),
        None => format!("Without reasoning, give a sudden intuition about {}. One sentence.", topic),
    }
}

pub fn other_voice(other: &SimulatedOther, topic: &str, last_thought: Option<&str>) -> String {
    format!(
        "You are {}, who is {}. You are watching a mind think about {}.{}\n\
         Say one short line to it.",
        other.name,
        other.traits.join(" and "),
        topic,
        last_thought
            .map(|t| format!(" Its last thought was: \"{}\".", t))
            .unwrap_or_default(),
    )
}

pub fn observation(mind: &Mind) -> String {
    format!(
        "Describe one small thing a mind might sense in a room with {}. One sentence, concrete.",
        mind.environment.describe()
    )
}

/// Rough check that the same emotion profile wrote the prompt.
pub fn regime_of(emotions: &EmotionVector) -> Regime {
    Regime::for_emotion(emotions.dominant())
}
