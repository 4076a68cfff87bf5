//! Narrative data model edited by the dialogue graph.
//!
//! A [`Scene`] owns an ordered list of [`Dialogue`]s; each dialogue owns its
//! [`Choice`]s. The list order is meaningful: a choice without an explicit
//! target falls through to the next dialogue index.
//!
//! # Invariants
//! - `Dialogue::id` is unique within its scene and never changes after creation.
//! - Node positions are not part of the model; they are derived by the layout.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GraphError, GraphResult};

pub type SceneId = String;
pub type DialogueId = String;
/// Reference to a [`Character`] by id. Free text is tolerated for narrators.
pub type CharacterRef = String;

/// Lowest difficulty a dice roll may ask for.
pub const DICE_DIFFICULTY_MIN: i32 = 1;
/// Highest difficulty a dice roll may ask for (one d20).
pub const DICE_DIFFICULTY_MAX: i32 = 20;

/// Generates a fresh, globally unique dialogue id.
pub fn new_dialogue_id() -> DialogueId {
    format!("dialogue-{}", Uuid::new_v4())
}

/// Generates a fresh, globally unique choice id.
pub fn new_choice_id() -> String {
    format!("choice-{}", Uuid::new_v4())
}

// =============================================================================
// Scene
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    pub title: String,
    #[serde(default)]
    pub dialogues: Vec<Dialogue>,
}

impl Scene {
    pub fn new(id: impl Into<SceneId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            dialogues: Vec::new(),
        }
    }

    /// Builder used by hosts and tests to seed a scene.
    pub fn with_dialogues(mut self, dialogues: Vec<Dialogue>) -> Self {
        self.dialogues = dialogues;
        self
    }

    /// Returns the list index of the dialogue with `id`.
    pub fn dialogue_index(&self, id: &str) -> Option<usize> {
        self.dialogues.iter().position(|dialogue| dialogue.id == id)
    }

    pub fn dialogue(&self, id: &str) -> Option<&Dialogue> {
        self.dialogues.iter().find(|dialogue| dialogue.id == id)
    }

    #[inline]
    pub fn contains_dialogue(&self, id: &str) -> bool {
        self.dialogue_index(id).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dialogues.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dialogues.is_empty()
    }

    pub fn from_json(input: &str) -> GraphResult<Self> {
        parse_json(input)
    }

    pub fn to_json(&self) -> GraphResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| GraphError::Serialization {
            message: err.to_string(),
            src: String::new(),
            span: (0, 0).into(),
        })
    }
}

/// Parses the host's scene list.
pub fn scenes_from_json(input: &str) -> GraphResult<Vec<Scene>> {
    parse_json(input)
}

/// Parses the host's character list.
pub fn characters_from_json(input: &str) -> GraphResult<Vec<Character>> {
    parse_json(input)
}

fn parse_json<T: serde::de::DeserializeOwned>(input: &str) -> GraphResult<T> {
    serde_json::from_str(input).map_err(|err| GraphError::Serialization {
        message: err.to_string(),
        src: input.to_string(),
        span: (error_offset(input, err.line(), err.column()), 1).into(),
    })
}

/// Byte offset of a 1-based line/column position reported by serde_json.
fn error_offset(input: &str, line: usize, column: usize) -> usize {
    if line == 0 || column == 0 {
        return 0;
    }
    let Some(start) = input
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .try_fold(0_usize, |offset, len| offset.checked_add(len))
    else {
        return 0;
    };
    let Some(rest) = input.get(start..) else {
        return input.len().saturating_sub(1);
    };
    let within = rest
        .char_indices()
        .nth(column - 1)
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| rest.len().saturating_sub(1));
    (start + within).min(input.len().saturating_sub(1))
}

// =============================================================================
// Dialogue
// =============================================================================

/// One line of narration or speech plus its outgoing choices (a graph node).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct Dialogue {
    pub id: DialogueId,
    #[serde(default)]
    pub speaker: CharacterRef,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Explicit convergence target after a branch (only used without choices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_dialogue_id: Option<DialogueId>,
    /// Branch responses converge on the next non-response dialogue.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_response: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_directions: Option<String>,
}

impl Dialogue {
    /// Creates an empty dialogue (no speaker, text or choices) with `id`.
    pub fn new(id: impl Into<DialogueId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Creates an empty dialogue with a freshly generated id.
    pub fn empty() -> Self {
        Self::new(new_dialogue_id())
    }

    pub fn with_speaker(mut self, speaker: impl Into<CharacterRef>) -> Self {
        self.speaker = speaker.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Deep copy carrying a fresh dialogue id and fresh choice ids.
    ///
    /// Transition targets (`next_dialogue_id`, `next_scene_id`) and dice-roll
    /// payloads are copied verbatim: the copy is a variant branch that still
    /// leads where the original leads.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = new_dialogue_id();
        for choice in &mut copy.choices {
            choice.id = new_choice_id();
        }
        copy
    }

    /// Returns the convergence target, treating an empty string as absent.
    pub fn convergence_target(&self) -> Option<&str> {
        non_empty(self.next_dialogue_id.as_deref())
    }
}

// =============================================================================
// Choice
// =============================================================================

/// A player-facing option (an edge descriptor).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_scene_id: Option<SceneId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_dialogue_id: Option<DialogueId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dice_roll: Option<DiceRoll>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

/// Where a choice leads, resolved from its optional target fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceTransition<'a> {
    /// No target: advance to the next dialogue index (or end of scene).
    Advance,
    /// Jump to another scene.
    Scene(&'a str),
    /// Jump to a dialogue of the same scene.
    Dialogue(&'a str),
}

impl Choice {
    /// Creates a choice with a fresh id and no target.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_choice_id(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_next_dialogue(mut self, dialogue_id: impl Into<DialogueId>) -> Self {
        self.next_dialogue_id = Some(dialogue_id.into());
        self
    }

    pub fn with_next_scene(mut self, scene_id: impl Into<SceneId>) -> Self {
        self.next_scene_id = Some(scene_id.into());
        self
    }

    pub fn with_dice_roll(mut self, dice_roll: DiceRoll) -> Self {
        self.dice_roll = Some(dice_roll);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Resolves the meaningful transition. An intra-scene target wins over a
    /// scene target; empty strings count as unset.
    pub fn transition(&self) -> ChoiceTransition<'_> {
        if let Some(dialogue_id) = non_empty(self.next_dialogue_id.as_deref()) {
            ChoiceTransition::Dialogue(dialogue_id)
        } else if let Some(scene_id) = non_empty(self.next_scene_id.as_deref()) {
            ChoiceTransition::Scene(scene_id)
        } else {
            ChoiceTransition::Advance
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

// =============================================================================
// Dice roll payload
// =============================================================================

/// Probabilistic outcome attached to a choice. Evaluated by the runtime player,
/// never by the editor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct DiceRoll {
    pub enabled: bool,
    pub difficulty: i32,
    /// Character statistic the roll is made against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat: Option<String>,
    pub success_outcome: Outcome,
    pub failure_outcome: Outcome,
}

impl Default for DiceRoll {
    fn default() -> Self {
        Self {
            enabled: true,
            difficulty: 10,
            stat: None,
            success_outcome: Outcome::default(),
            failure_outcome: Outcome::default(),
        }
    }
}

impl DiceRoll {
    #[inline]
    pub fn difficulty_in_range(&self) -> bool {
        (DICE_DIFFICULTY_MIN..=DICE_DIFFICULTY_MAX).contains(&self.difficulty)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub moral: i32,
    #[serde(default)]
    pub illustration: String,
}

/// Game-variable change applied when a choice is taken.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Effect {
    pub variable: String,
    pub value: i32,
    pub operation: EffectOperation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum EffectOperation {
    Add,
    Set,
    Multiply,
}

// =============================================================================
// Characters (read-only collaborator data)
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
}

impl Character {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Resolves a speaker reference to a display name. Unknown references are
/// shown as written; an empty speaker has no name.
pub fn speaker_name<'a>(speaker: &'a str, characters: &'a [Character]) -> Option<&'a str> {
    let speaker = speaker.trim();
    if speaker.is_empty() {
        return None;
    }
    Some(
        characters
            .iter()
            .find(|character| character.id == speaker)
            .map(|character| character.name.as_str())
            .unwrap_or(speaker),
    )
}

// =============================================================================
// Patches
// =============================================================================

/// Shallow patch merged into a [`Dialogue`]. `None` leaves a field untouched;
/// nested options (`Some(None)`) clear an optional field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DialoguePatch {
    pub speaker: Option<CharacterRef>,
    pub text: Option<String>,
    pub choices: Option<Vec<Choice>>,
    pub next_dialogue_id: Option<Option<DialogueId>>,
    pub is_response: Option<bool>,
    pub speaker_mood: Option<Option<String>>,
    pub stage_directions: Option<Option<String>>,
}

impl DialoguePatch {
    pub fn apply(&self, dialogue: &mut Dialogue) {
        if let Some(speaker) = &self.speaker {
            dialogue.speaker = speaker.clone();
        }
        if let Some(text) = &self.text {
            dialogue.text = text.clone();
        }
        if let Some(choices) = &self.choices {
            dialogue.choices = choices.clone();
        }
        if let Some(next) = &self.next_dialogue_id {
            dialogue.next_dialogue_id = next.clone();
        }
        if let Some(is_response) = self.is_response {
            dialogue.is_response = is_response;
        }
        if let Some(mood) = &self.speaker_mood {
            dialogue.speaker_mood = mood.clone();
        }
        if let Some(directions) = &self.stage_directions {
            dialogue.stage_directions = directions.clone();
        }
    }
}

/// Shallow patch merged into a [`Choice`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChoicePatch {
    pub text: Option<String>,
    pub next_scene_id: Option<Option<SceneId>>,
    pub next_dialogue_id: Option<Option<DialogueId>>,
    pub dice_roll: Option<Option<DiceRoll>>,
    pub effects: Option<Vec<Effect>>,
}

impl ChoicePatch {
    pub fn apply(&self, choice: &mut Choice) {
        if let Some(text) = &self.text {
            choice.text = text.clone();
        }
        if let Some(next) = &self.next_scene_id {
            choice.next_scene_id = next.clone();
        }
        if let Some(next) = &self.next_dialogue_id {
            choice.next_dialogue_id = next.clone();
        }
        if let Some(dice_roll) = &self.dice_roll {
            choice.dice_roll = dice_roll.clone();
        }
        if let Some(effects) = &self.effects {
            choice.effects = effects.clone();
        }
    }
}
