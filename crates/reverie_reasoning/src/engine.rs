//! The cycle engine.
//!
//! `Engine` owns the mind and is its only writer. One call to
//! [`Engine::tick`] is one cycle: the prelude (pulse, maturity, stimulus,
//! persona, modulators), the stages chosen by the decision table, the
//! stuck/topic check and finally the emotional perturbation.
//!
//! Generation failures never escape: the marker text takes the place of
//! the missing thought and is remembered as `last_error`.

use crate::cycle::{CycleInputs, CycleKind, CyclePlan, Stage};
use crate::llm::{generate_or_marker, Generation, TextGenerator};
use crate::mind::{Mind, MindSnapshot, TOPIC_LOCK};
use crate::prompts::{self, ThoughtContext};
use crate::scheduler::Patch;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reverie_core::model::now_ts;
use reverie_core::text::{clip, content_tokens};
use reverie_core::{DreamEntry, Emotion, Goal, MemoryFragment, Mode, SubAgent};
use reverie_expression::rumination::BELIEF_REINFORCEMENT;
use reverie_expression::{goals, select_topic, SubconsciousPlan, TriggerPhrases};
use reverie_limbic::{perturb, tension, Arbitrator, EmotionModulators};
use reverie_memory::dream::{self, DreamSeed};
use reverie_memory::{ContradictionDetector, CooccurrenceTable};
use reverie_perception::{environment, Perception, StimulusKind};
use std::sync::Arc;

pub const MAX_ATTEMPTS: usize = 3;
pub const OTHER_VOICE_CHANCE: f64 = 0.15;
pub const STIMULUS_STRENGTH: f32 = 0.3;
pub const INTUITION_STRENGTH: f32 = 0.5;
pub const BELIEF_NUDGE: f32 = 0.05;
pub const IDENTITY_QUESTION_CHANCE: f64 = 0.1;
/// Tension added per newly detected contradiction.
pub const CONTRADICTION_TENSION: f32 = 0.1;
pub const INSPECTION_GOAL_URGENCY: f32 = 0.6;
pub const STUCK_TENSION: f32 = 0.7;
pub const STUCK_RELIEF: f32 = 0.3;
/// Memories the stuck check reads.
pub const STUCK_WINDOW: usize = 3;
const STUCK_WORDS: &[&str] = &["ugh", "stuck", "again", "loop", "same thought", "repeat"];
const MOTIF_COUNT: usize = 3;

const DREAM_ENTRY: [(Emotion, f32); 2] = [(Emotion::Dreaming, 0.2), (Emotion::Curiosity, -0.1)];
const DREAM_EXIT: [(Emotion, f32); 2] = [(Emotion::Dreaming, -0.1), (Emotion::Curiosity, 0.05)];
const GOAL_PULL: [(Emotion, f32); 2] = [(Emotion::Reflective, 0.05), (Emotion::Curiosity, 0.05)];
const UNSTICK: [(Emotion, f32); 2] = [(Emotion::Reflective, 0.1), (Emotion::Anxiety, -0.1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsideKind {
    Intuition,
    OtherVoice,
}

/// A generation request that must not hold up the cycle. Its result comes
/// back later as a [`Patch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aside {
    pub kind: AsideKind,
    pub prompt: String,
}

impl Aside {
    pub async fn resolve(self, generator: &dyn TextGenerator) -> Patch {
        let text = generate_or_marker(generator, &self.prompt).await.text;
        match self.kind {
            AsideKind::Intuition => Patch::Intuition(text),
            AsideKind::OtherVoice => Patch::OtherVoice(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub kind: CycleKind,
    /// The cycle entered dream mode; the caller owes a timed revert.
    pub dream_started: bool,
    pub asides: Vec<Aside>,
}

pub struct Engine {
    mind: Mind,
    generator: Arc<dyn TextGenerator>,
    perception: Perception,
    arbiter: Arbitrator,
    detector: ContradictionDetector,
    triggers: TriggerPhrases,
    cooccurrence: CooccurrenceTable,
    modulators: EmotionModulators,
    rng: StdRng,
    persona: usize,
    pulse: bool,
    cycles: u64,
    last_cycle: Option<CycleKind>,
    last_error: Option<String>,
    /// Attention was updated by a thought during the current cycle
    attended: bool,
}

impl Engine {
    /// `seed` makes the run reproducible. A mind persisted mid-dream wakes
    /// up in run mode, since its revert timer died with the old process.
    pub fn new(
        mind: Mind,
        generator: Arc<dyn TextGenerator>,
        perception: Perception,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let modulators =
            EmotionModulators::compute(&mind.emotions, mind.maturity, mind.state.bias);
        let mut engine = Self {
            mind,
            generator,
            perception,
            arbiter: Arbitrator::default(),
            detector: ContradictionDetector::default(),
            triggers: TriggerPhrases,
            cooccurrence: CooccurrenceTable::new(),
            modulators,
            rng,
            persona: 0,
            pulse: false,
            cycles: 0,
            last_cycle: None,
            last_error: None,
            attended: false,
        };
        if engine.mind.mode == Mode::Dream {
            engine.revert_dream();
        }
        engine
    }

    pub fn mind(&self) -> &Mind {
        &self.mind
    }

    pub fn mind_mut(&mut self) -> &mut Mind {
        &mut self.mind
    }

    pub fn generator(&self) -> Arc<dyn TextGenerator> {
        Arc::clone(&self.generator)
    }

    pub fn persona(&self) -> &SubAgent {
        self.arbiter.get(self.persona)
    }

    pub fn modulators(&self) -> &EmotionModulators {
        &self.modulators
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_real_feed(&mut self, on: bool) {
        self.perception.set_real_feed(on);
    }

    pub fn snapshot(&self) -> MindSnapshot {
        MindSnapshot {
            mind: self.mind.clone(),
            pulse: self.pulse,
            cycles: self.cycles,
            last_cycle: self.last_cycle,
            last_error: self.last_error.clone(),
            persona: self.persona().name.clone(),
            real_feed: self.perception.real_feed(),
        }
    }

    /// Run one full cycle.
    pub async fn tick(&mut self) -> CycleReport {
        self.prelude().await;
        let inputs = CycleInputs {
            dream_chance: self.modulators.dream_chance,
            committed: self.mind.state.fragments_committed,
            maturity: self.mind.maturity.get(),
            has_goal: goals::most_urgent(&self.mind.state.goals).is_some(),
        };
        let plan = CyclePlan::decide(&inputs, &mut self.rng);
        self.run(plan).await
    }

    /// Run one cycle with the stages fixed in advance.
    pub async fn tick_with(&mut self, plan: CyclePlan) -> CycleReport {
        self.prelude().await;
        self.run(plan).await
    }

    async fn prelude(&mut self) {
        self.pulse = !self.pulse;
        self.mind.maturity.advance();
        self.perceive().await;
        self.persona = self.arbiter.select(
            self.mind.state.tension.get(),
            self.mind.mode,
            &mut self.rng,
        );
        self.mind.state.dominant = self.persona().name.clone();
        self.modulators =
            EmotionModulators::compute(&self.mind.emotions, self.mind.maturity, self.mind.state.bias);
    }

    async fn run(&mut self, plan: CyclePlan) -> CycleReport {
        let kind = plan.kind();
        tracing::info!(
            "Cycle {}: {} ({}, topic {})",
            self.cycles + 1,
            kind,
            self.persona().name,
            self.mind.topic
        );
        let mut report = CycleReport {
            kind,
            dream_started: false,
            asides: Vec::new(),
        };

        self.attended = false;
        for stage in &plan.stages {
            match stage {
                Stage::Dream => self.dream(&mut report).await,
                Stage::Subconscious => self.subconscious(&mut report),
                Stage::SchemaCheck => self.schema_check(),
                Stage::SelfInspection => self.self_inspection().await,
                Stage::Goal => self.pursue_goal().await,
                Stage::Normal => self.think(&mut report).await,
            }
        }
        if !self.attended {
            self.mind.state.attention.decay();
        }
        if plan.stuck_check {
            self.topic_check();
        }
        perturb(&mut self.mind.emotions, self.mind.state.tension.get(), &mut self.rng);

        self.cycles += 1;
        self.last_cycle = Some(kind);
        report
    }

    async fn generate(&mut self, prompt: &str) -> Generation {
        let generation = generate_or_marker(self.generator.as_ref(), prompt).await;
        if generation.failed {
            self.last_error = Some(generation.text.clone());
        }
        self.mind.state.push_stream(&generation.text);
        generation
    }

    /// Insert into the memory stack. The decay sweep feeds the
    /// co-occurrence table with every fragment already held.
    fn commit(&mut self, fragment: MemoryFragment) {
        let decay = self.modulators.memory_decay;
        let table = &mut self.cooccurrence;
        self.mind.memory.push_with(fragment, decay, |f| table.observe(&f.text));
        self.mind.state.fragments_committed += 1;
    }

    fn set_topic(&mut self, topic: String) {
        if topic != self.mind.topic {
            tracing::debug!("Topic: {} -> {}", self.mind.topic, topic);
        }
        self.mind.topic = topic;
    }

    async fn perceive(&mut self) {
        let Some(kind) = self.perception.pick(&mut self.rng) else {
            return;
        };
        let text = match kind {
            StimulusKind::Generated => {
                let prompt = prompts::observation(&self.mind);
                self.generate(&prompt).await.text
            }
            _ => {
                let observed = self
                    .perception
                    .observe(kind, &mut self.mind.environment, &mut self.rng)
                    .await;
                match observed {
                    Some(text) => text,
                    None => return,
                }
            }
        };
        tracing::debug!("Stimulus ({}): {}", kind.source_tag(), text);
        let fragment = MemoryFragment::new(text, self.mind.emotions.dominant(), STIMULUS_STRENGTH)
            .with_source(kind.source_tag());
        self.commit(fragment);
    }

    // =========================================================================
    // Stages
    // =========================================================================

    async fn dream(&mut self, report: &mut CycleReport) {
        self.mind.mode = Mode::Dream;
        self.mind.emotions.adjust(&DREAM_ENTRY);

        let seed = DreamSeed::gather(&self.mind.memory, &self.mind.concepts, &mut self.rng);
        let prompt = prompts::dream(&seed, &self.mind);
        let dream = self.generate(&prompt).await.text;
        self.commit(MemoryFragment::new(&dream, Emotion::Dreaming, 1.0).with_source("dream"));

        let reflection = self.generate(&prompts::dream_reflection(&dream)).await;
        if !reflection.failed {
            self.absorb_dream_reflection(&reflection.text);
        }
        let state = &mut self.mind.state;
        state.self_model.record_change(format!("dreamed: {}", clip(&dream, 60)));
        state.record_dream(DreamEntry {
            timestamp: now_ts(),
            motifs: dream::motifs(&dream, MOTIF_COUNT),
            fragment: dream,
        });
        report.dream_started = true;
    }

    fn absorb_dream_reflection(&mut self, reflection: &str) {
        let state = &mut self.mind.state;
        state.concerns.update_conflicts(reflection);
        let sentences = sentences(reflection);
        for s in sentences.iter().filter(|s| s.ends_with('?')) {
            state.concerns.add_question(*s);
        }
        if let Some(first) = sentences.first() {
            state.self_model.record_insight(*first);
        }
    }

    /// Leave dream mode and partly undo the dream bias. No-op outside a dream.
    pub fn revert_dream(&mut self) {
        if self.mind.mode != Mode::Dream {
            return;
        }
        self.mind.mode = Mode::Run;
        self.mind.emotions.adjust(&DREAM_EXIT);
        tracing::debug!("Dream mode reverted");
    }

    fn subconscious(&mut self, report: &mut CycleReport) {
        let plan = SubconsciousPlan::draw(
            &self.mind.state.concerns,
            self.mind.state.beliefs.len(),
            &mut self.rng,
        );
        let about = plan.fragment.as_ref().map(|f| f.text.clone());
        if let Some(fragment) = plan.fragment {
            self.commit(fragment);
        }
        if let Some(i) = plan.reinforce {
            if let Some(belief) = self.mind.state.beliefs.get_mut(i) {
                belief.adjust_confidence(BELIEF_REINFORCEMENT);
                tracing::debug!("Belief reinforced: {} ({:.2})", belief.concept, belief.confidence);
            }
        }
        if plan.request_intuition {
            report.asides.push(Aside {
                kind: AsideKind::Intuition,
                prompt: prompts::intuition(about.as_deref(), &self.mind.topic),
            });
        }
    }

    fn schema_check(&mut self) {
        if let Some(name) = self.cooccurrence.form_schema(&mut self.mind.concepts) {
            self.mind
                .state
                .concerns
                .add_question(format!("What does {} mean?", name));
            self.mind.emotions.nudge(Emotion::Curiosity, 0.1);
        }
    }

    async fn self_inspection(&mut self) {
        let detected = self
            .detector
            .detect(&self.mind.state.beliefs, &self.mind.belief_graph);
        let fresh = self.mind.state.concerns.absorb_conflicts(detected);
        self.mind
            .state
            .tension
            .raise(CONTRADICTION_TENSION * fresh as f32);

        let prompt = prompts::meta_reflection(&self.mind);
        let reflection = self.generate(&prompt).await;
        self.commit(
            MemoryFragment::new(&reflection.text, Emotion::Reflective, 1.0).with_source("reflection"),
        );

        if !reflection.failed {
            let outcome = self.triggers.scan(&reflection.text);
            let state = &mut self.mind.state;
            if !outcome.emotion.is_empty() {
                self.mind.emotions.adjust(&outcome.emotion);
            }
            state.bias.shift_topic_switch(outcome.topic_switch_shift);
            state.bias.shift_dream(outcome.dream_shift);
            if let Some(goal) = outcome.new_goal {
                if !state.goals.iter().any(|g| g.description == goal) {
                    tracing::info!("Goal from self-inspection: {}", goal);
                    state.goals.push(Goal::new(&goal, INSPECTION_GOAL_URGENCY));
                }
            }
            for insight in outcome.insights {
                state.self_model.record_insight(insight);
            }
        }
        self.mind.state.self_model.last_conflict =
            self.mind.state.concerns.conflicts.iter().next().cloned();

        let persona = self.persona().clone();
        if let Some(topic) = select_topic(
            &reflection.text,
            &persona,
            &self.mind.state.attention,
            &self.mind.concepts,
            &mut self.rng,
        ) {
            self.set_topic(topic);
        }
        self.mind.topic_lock = TOPIC_LOCK;
    }

    async fn pursue_goal(&mut self) {
        let Some(i) = goals::most_urgent(&self.mind.state.goals) else {
            return;
        };
        let goal = self.mind.state.goals[i].clone();
        let persona = self.persona().clone();
        let generation = self.generate(&prompts::goal(&goal, &self.mind, &persona)).await;
        let dominant = self.mind.emotions.dominant();
        self.commit(MemoryFragment::new(&generation.text, dominant, 1.0).with_source("goal"));

        if let Some(goal) = self.mind.state.goals.get_mut(i) {
            goals::pursue(goal);
        }
        self.mind.emotions.adjust(&GOAL_PULL);
        if !generation.failed {
            self.mind.concepts.link_fragment(&generation.text);
        }
    }

    async fn think(&mut self, report: &mut CycleReport) {
        let persona = self.persona().clone();
        if self.rng.gen_bool(OTHER_VOICE_CHANCE) {
            report.asides.push(Aside {
                kind: AsideKind::OtherVoice,
                prompt: prompts::other_voice(
                    &self.mind.other,
                    &self.mind.topic,
                    self.mind.memory.newest().map(|f| f.text.as_str()),
                ),
            });
        }
        let goal = goals::most_urgent(&self.mind.state.goals).map(|i| self.mind.state.goals[i].clone());

        let mut accepted = None;
        for attempt in 0..MAX_ATTEMPTS {
            let prompt = {
                let ctx = ThoughtContext {
                    mind: &self.mind,
                    persona: &persona,
                    goal: goal.as_ref(),
                    attempt,
                };
                prompts::thought(&ctx, &mut self.rng)
            };
            let generation = self.generate(&prompt).await;
            if generation.failed || !self.mind.memory.is_too_similar(&generation.text) {
                accepted = Some((generation, attempt == 0));
                break;
            }
            tracing::debug!("Attempt {} repeats a recent memory", attempt + 1);
        }

        let (text, novel, failed) = match accepted {
            Some((g, novel)) => (g.text, novel, g.failed),
            None => {
                tracing::warn!("Thought generation stuck on {}", self.mind.topic);
                (
                    format!("(Stuck) My thoughts keep circling back to {}.", self.mind.topic),
                    false,
                    false,
                )
            }
        };

        let dominant = self.mind.emotions.dominant();
        self.commit(MemoryFragment::new(&text, dominant, 1.0));
        if !failed {
            self.absorb_thought(&text, dominant, novel, &persona);
        }
    }

    /// Let a committed thought ripple through every store it touches.
    fn absorb_thought(&mut self, text: &str, dominant: Emotion, novel: bool, persona: &SubAgent) {
        let lower = text.to_lowercase();
        let threshold = self.modulators.belief_threshold;
        let nudge = BELIEF_NUDGE + persona.belief_bias;
        for belief in self.mind.state.beliefs.iter_mut() {
            if self.rng.gen::<f32>() > threshold && lower.contains(&belief.concept) {
                belief.adjust_confidence(nudge);
            }
        }

        let state = &mut self.mind.state;
        state.concerns.update_conflicts(text);
        state.concerns.update_questions(text, &mut self.rng);
        tension::apply(&mut state.tension, dominant, novel);
        goals::settle(&mut state.goals, text);
        goals::maybe_adopt(&mut state.goals, &self.mind.topic, &mut self.rng);

        state.self_model.last_emotion = dominant;
        state.self_model.loop_detected = !novel;
        if self.rng.gen_bool(IDENTITY_QUESTION_CHANCE) {
            let change = format!(
                "wondered whether {} is still who is thinking",
                state.self_model.identity
            );
            state.self_model.record_change(change);
        }

        state.attention.update(content_tokens(text));
        self.attended = true;
        self.mind.concepts.link_fragment(text);
        self.mind.belief_graph.link_fragment(text);
        if environment::react(&mut self.mind.environment, text) {
            tracing::debug!("Environment shifted: {}", self.mind.environment.describe());
        }
    }

    // =========================================================================
    // Stuck / topic shift
    // =========================================================================

    /// Break a loop if one is showing, otherwise maybe drift to a new topic.
    pub fn topic_check(&mut self) {
        let looping = self
            .mind
            .memory
            .recent_texts(STUCK_WINDOW)
            .iter()
            .any(|t| {
                let lower = t.to_lowercase();
                STUCK_WORDS.iter().any(|w| lower.contains(w))
            });

        if looping || self.mind.state.tension.get() > STUCK_TENSION {
            if let Some(topic) = self.mind.concepts.random_concept(&mut self.rng) {
                self.set_topic(topic);
            }
            self.mind.emotions.adjust(&UNSTICK);
            self.mind.state.tension.lower(STUCK_RELIEF);
            self.mind.topic_lock = TOPIC_LOCK;
            tracing::info!("Stuck: forced topic {}", self.mind.topic);
        } else if self.mind.topic_lock == 0 || self.rng.gen::<f32>() < self.modulators.topic_switch {
            let thought = self.mind.memory.newest().map(|f| f.text.clone()).unwrap_or_default();
            let persona = self.persona().clone();
            if let Some(topic) = select_topic(
                &thought,
                &persona,
                &self.mind.state.attention,
                &self.mind.concepts,
                &mut self.rng,
            ) {
                self.set_topic(topic);
            }
            self.mind.topic_lock = TOPIC_LOCK;
        } else {
            self.mind.topic_lock -= 1;
        }
    }

    // =========================================================================
    // Patches
    // =========================================================================

    /// Fold the late result of an aside into the mind.
    pub fn apply_patch(&mut self, patch: Patch) {
        let text = match &patch {
            Patch::Intuition(t) | Patch::OtherVoice(t) => t.clone(),
        };
        if crate::llm::is_marker(&text) {
            self.last_error = Some(text.clone());
        }
        self.mind.state.push_stream(&text);
        match patch {
            Patch::Intuition(text) => {
                tracing::debug!("Intuition arrived: {}", text);
                self.commit(
                    MemoryFragment::new(text, Emotion::Reflective, INTUITION_STRENGTH)
                        .with_source("intuition"),
                );
            }
            Patch::OtherVoice(text) => {
                tracing::debug!("{} speaks: {}", self.mind.other.name, text);
                self.mind.other.last_words = Some(text);
            }
        }
    }
}

/// Sentences with their closing punctuation, trimmed.
fn sentences(text: &str) -> Vec<&str> {
    text.split_inclusive(&['.', '!', '?'][..])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentences_keep_punctuation() {
        assert_eq!(
            sentences("The door was mine. Why did it open? It hummed"),
            vec!["The door was mine.", "Why did it open?", "It hummed"]
        );
    }
}
