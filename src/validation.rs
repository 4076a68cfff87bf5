//! Advisory checks over a scene's dialogues.
//!
//! Nothing here blocks an edit: dangling references left behind by a delete,
//! empty fields and unreachable dialogues are reported so the author can fix
//! them at leisure.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::model::{
    Character, ChoiceTransition, DialogueId, Scene, DICE_DIFFICULTY_MAX, DICE_DIFFICULTY_MIN,
};
use crate::projection::project;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LintSeverity {
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LintCode {
    DuplicateDialogueId,
    DanglingDialogueTarget,
    DanglingSceneTarget,
    DanglingConvergenceTarget,
    EmptySpeaker,
    UnknownSpeaker,
    EmptyText,
    EmptyChoiceText,
    DuplicateChoiceText,
    DiceDifficultyOutOfRange,
    UnreachableDialogue,
}

impl LintCode {
    pub fn label(self) -> &'static str {
        match self {
            LintCode::DuplicateDialogueId => "VAL_DIALOGUE_ID_DUPLICATE",
            LintCode::DanglingDialogueTarget => "VAL_DIALOGUE_TARGET_MISSING",
            LintCode::DanglingSceneTarget => "VAL_SCENE_TARGET_MISSING",
            LintCode::DanglingConvergenceTarget => "VAL_CONVERGENCE_MISSING",
            LintCode::EmptySpeaker => "VAL_SPEAKER_EMPTY",
            LintCode::UnknownSpeaker => "VAL_SPEAKER_UNKNOWN",
            LintCode::EmptyText => "VAL_TEXT_EMPTY",
            LintCode::EmptyChoiceText => "VAL_CHOICE_TEXT_EMPTY",
            LintCode::DuplicateChoiceText => "VAL_CHOICE_DUPLICATE",
            LintCode::DiceDifficultyOutOfRange => "VAL_DICE_DIFFICULTY",
            LintCode::UnreachableDialogue => "VAL_UNREACHABLE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintIssue {
    pub dialogue_id: DialogueId,
    pub choice_index: Option<usize>,
    pub severity: LintSeverity,
    pub code: LintCode,
    pub message: String,
}

impl LintIssue {
    pub fn new(
        dialogue_id: &str,
        choice_index: Option<usize>,
        severity: LintSeverity,
        code: LintCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            dialogue_id: dialogue_id.to_string(),
            choice_index,
            severity,
            code,
            message: message.into(),
        }
    }

    pub fn warning(
        dialogue_id: &str,
        choice_index: Option<usize>,
        code: LintCode,
        message: impl Into<String>,
    ) -> Self {
        Self::new(dialogue_id, choice_index, LintSeverity::Warning, code, message)
    }

    pub fn info(dialogue_id: &str, code: LintCode, message: impl Into<String>) -> Self {
        Self::new(dialogue_id, None, LintSeverity::Info, code, message)
    }
}

/// Collaborator data the checks resolve references against.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidationContext<'a> {
    /// Every scene of the project, for cross-scene targets.
    pub scenes: &'a [Scene],
    pub characters: &'a [Character],
}

/// Runs all checks on `scene`, in dialogue order.
pub fn validate(scene: &Scene, context: &ValidationContext<'_>) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    issues.extend(check_ids(scene));
    issues.extend(check_fields(scene, context));
    issues.extend(check_choices(scene, context));
    issues.extend(check_convergence(scene));
    issues.extend(check_unreachable(scene));

    let order: BTreeMap<&str, usize> = scene
        .dialogues
        .iter()
        .enumerate()
        .map(|(idx, dialogue)| (dialogue.id.as_str(), idx))
        .collect();
    issues.sort_by_key(|issue| {
        (
            order.get(issue.dialogue_id.as_str()).copied().unwrap_or(usize::MAX),
            issue.choice_index,
        )
    });
    issues
}

/// Graph, layout and selection all key on dialogue ids; a repeated id leaves
/// only its last occurrence addressable.
fn check_ids(scene: &Scene) -> Vec<LintIssue> {
    let mut seen: HashSet<&str> = HashSet::new();
    scene
        .dialogues
        .iter()
        .filter(|dialogue| !seen.insert(dialogue.id.as_str()))
        .map(|dialogue| {
            LintIssue::warning(
                &dialogue.id,
                None,
                LintCode::DuplicateDialogueId,
                format!("Dialogue id `{}` is used more than once", dialogue.id),
            )
        })
        .collect()
}

fn check_fields(scene: &Scene, context: &ValidationContext<'_>) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    for dialogue in &scene.dialogues {
        let speaker = dialogue.speaker.trim();
        if speaker.is_empty() {
            issues.push(LintIssue::warning(
                &dialogue.id,
                None,
                LintCode::EmptySpeaker,
                "Dialogue has no speaker",
            ));
        } else if !context.characters.is_empty()
            && !context
                .characters
                .iter()
                .any(|character| character.id == speaker || character.name == speaker)
        {
            issues.push(LintIssue::info(
                &dialogue.id,
                LintCode::UnknownSpeaker,
                format!("Speaker `{speaker}` is not a known character"),
            ));
        }

        if dialogue.text.trim().is_empty() {
            issues.push(LintIssue::warning(
                &dialogue.id,
                None,
                LintCode::EmptyText,
                "Dialogue has no text",
            ));
        }
    }
    issues
}

fn check_choices(scene: &Scene, context: &ValidationContext<'_>) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let scene_ids: HashSet<&str> = context.scenes.iter().map(|scene| scene.id.as_str()).collect();

    for dialogue in &scene.dialogues {
        let mut seen_texts: HashSet<String> = HashSet::new();
        for (idx, choice) in dialogue.choices.iter().enumerate() {
            let text = choice.text.trim();
            if text.is_empty() {
                issues.push(LintIssue::warning(
                    &dialogue.id,
                    Some(idx),
                    LintCode::EmptyChoiceText,
                    format!("Choice {} has no text", idx + 1),
                ));
            } else if !seen_texts.insert(text.to_lowercase()) {
                issues.push(LintIssue::warning(
                    &dialogue.id,
                    Some(idx),
                    LintCode::DuplicateChoiceText,
                    format!("Choice text `{text}` appears more than once"),
                ));
            }

            match choice.transition() {
                ChoiceTransition::Dialogue(target) if !scene.contains_dialogue(target) => {
                    issues.push(LintIssue::warning(
                        &dialogue.id,
                        Some(idx),
                        LintCode::DanglingDialogueTarget,
                        format!("Choice {} points to missing dialogue `{target}`", idx + 1),
                    ));
                }
                ChoiceTransition::Scene(target) if !scene_ids.contains(target) => {
                    issues.push(LintIssue::warning(
                        &dialogue.id,
                        Some(idx),
                        LintCode::DanglingSceneTarget,
                        format!("Choice {} points to missing scene `{target}`", idx + 1),
                    ));
                }
                _ => {}
            }

            if let Some(dice_roll) = &choice.dice_roll {
                if !dice_roll.difficulty_in_range() {
                    issues.push(LintIssue::warning(
                        &dialogue.id,
                        Some(idx),
                        LintCode::DiceDifficultyOutOfRange,
                        format!(
                            "Dice difficulty {} is outside {}..={}",
                            dice_roll.difficulty, DICE_DIFFICULTY_MIN, DICE_DIFFICULTY_MAX
                        ),
                    ));
                }
            }
        }
    }
    issues
}

fn check_convergence(scene: &Scene) -> Vec<LintIssue> {
    scene
        .dialogues
        .iter()
        .filter_map(|dialogue| {
            let target = dialogue.convergence_target()?;
            if scene.contains_dialogue(target) {
                return None;
            }
            Some(LintIssue::warning(
                &dialogue.id,
                None,
                LintCode::DanglingConvergenceTarget,
                format!("Convergence target `{target}` does not exist"),
            ))
        })
        .collect()
}

fn check_unreachable(scene: &Scene) -> Vec<LintIssue> {
    project(scene)
        .unreachable_nodes()
        .into_iter()
        .map(|id| {
            LintIssue::info(
                id,
                LintCode::UnreachableDialogue,
                "Dialogue cannot be reached from the start of the scene",
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
