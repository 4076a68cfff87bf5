//! Mutation API over the externally owned scene store.
//!
//! Every operation is keyed by dialogue id, reads the current scene, builds the
//! complete replacement dialogue list and commits it with one
//! [`SceneStore::replace_dialogues`] call. A rejected operation returns an
//! error and leaves the store untouched.
//!
//! References to a deleted dialogue are never rewritten; they surface as
//! validation warnings instead.

use tracing::{info, instrument, warn};

use crate::error::{GraphError, GraphResult};
use crate::model::{Choice, ChoicePatch, Dialogue, DialogueId, DialoguePatch};
use crate::store::SceneStore;

fn load_dialogues<S: SceneStore + ?Sized>(store: &S, scene_id: &str) -> GraphResult<Vec<Dialogue>> {
    store
        .scene(scene_id)
        .map(|scene| scene.dialogues.clone())
        .ok_or_else(|| GraphError::SceneNotFound(scene_id.to_string()))
}

fn find_dialogue(dialogues: &[Dialogue], scene_id: &str, id: &str) -> GraphResult<usize> {
    dialogues
        .iter()
        .position(|dialogue| dialogue.id == id)
        .ok_or_else(|| GraphError::dialogue_not_found(scene_id, id))
}

fn commit<S: SceneStore + ?Sized>(
    store: &mut S,
    scene_id: &str,
    dialogues: Vec<Dialogue>,
) -> GraphResult<()> {
    if store.replace_dialogues(scene_id, dialogues) {
        Ok(())
    } else {
        warn!(scene_id, "scene store rejected dialogue update");
        Err(GraphError::StoreRejected(scene_id.to_string()))
    }
}

fn check_choice_index(dialogue: &Dialogue, index: usize) -> GraphResult<()> {
    if index < dialogue.choices.len() {
        Ok(())
    } else {
        Err(GraphError::ChoiceOutOfRange {
            dialogue_id: dialogue.id.clone(),
            index,
            len: dialogue.choices.len(),
        })
    }
}

// =============================================================================
// Dialogues
// =============================================================================

/// Inserts an empty dialogue after `after_id`, or at the end of the scene.
/// Returns the new dialogue id.
#[instrument(skip(store))]
pub fn create_dialogue<S: SceneStore + ?Sized>(
    store: &mut S,
    scene_id: &str,
    after_id: Option<&str>,
) -> GraphResult<DialogueId> {
    let mut dialogues = load_dialogues(store, scene_id)?;
    let insert_at = match after_id {
        Some(after_id) => find_dialogue(&dialogues, scene_id, after_id)? + 1,
        None => dialogues.len(),
    };

    let dialogue = Dialogue::empty();
    let new_id = dialogue.id.clone();
    dialogues.insert(insert_at, dialogue);
    commit(store, scene_id, dialogues)?;

    info!(dialogue_id = %new_id, index = insert_at, "created dialogue");
    Ok(new_id)
}

/// Removes a dialogue. Returns the removed entity.
#[instrument(skip(store))]
pub fn delete_dialogue<S: SceneStore + ?Sized>(
    store: &mut S,
    scene_id: &str,
    id: &str,
) -> GraphResult<Dialogue> {
    let mut dialogues = load_dialogues(store, scene_id)?;
    let index = find_dialogue(&dialogues, scene_id, id)?;
    let removed = dialogues.remove(index);

    let dangling = dialogues
        .iter()
        .filter(|dialogue| {
            dialogue.convergence_target() == Some(id)
                || dialogue
                    .choices
                    .iter()
                    .any(|choice| choice.next_dialogue_id.as_deref() == Some(id))
        })
        .count();
    commit(store, scene_id, dialogues)?;

    if dangling > 0 {
        warn!(dialogue_id = id, dangling, "deleted dialogue is still referenced");
    }
    info!(dialogue_id = id, index, "deleted dialogue");
    Ok(removed)
}

/// Deep-copies a dialogue right after the source, with fresh dialogue and
/// choice ids. Returns the id of the copy.
#[instrument(skip(store))]
pub fn duplicate_dialogue<S: SceneStore + ?Sized>(
    store: &mut S,
    scene_id: &str,
    id: &str,
) -> GraphResult<DialogueId> {
    let mut dialogues = load_dialogues(store, scene_id)?;
    let index = find_dialogue(&dialogues, scene_id, id)?;

    let copy = dialogues[index].duplicate();
    let copy_id = copy.id.clone();
    dialogues.insert(index + 1, copy);
    commit(store, scene_id, dialogues)?;

    info!(source = id, dialogue_id = %copy_id, "duplicated dialogue");
    Ok(copy_id)
}

/// Shallow-merges `patch` into a dialogue.
#[instrument(skip(store, patch))]
pub fn update_dialogue<S: SceneStore + ?Sized>(
    store: &mut S,
    scene_id: &str,
    id: &str,
    patch: &DialoguePatch,
) -> GraphResult<()> {
    let mut dialogues = load_dialogues(store, scene_id)?;
    let index = find_dialogue(&dialogues, scene_id, id)?;
    patch.apply(&mut dialogues[index]);
    commit(store, scene_id, dialogues)
}

// =============================================================================
// Choices
// =============================================================================

/// Shallow-merges `patch` into one choice of a dialogue.
#[instrument(skip(store, patch))]
pub fn update_choice<S: SceneStore + ?Sized>(
    store: &mut S,
    scene_id: &str,
    id: &str,
    choice_index: usize,
    patch: &ChoicePatch,
) -> GraphResult<()> {
    let mut dialogues = load_dialogues(store, scene_id)?;
    let index = find_dialogue(&dialogues, scene_id, id)?;
    check_choice_index(&dialogues[index], choice_index)?;
    patch.apply(&mut dialogues[index].choices[choice_index]);
    commit(store, scene_id, dialogues)
}

/// Inserts `choice` at `choice_index`; an index equal to the choice count
/// appends.
#[instrument(skip(store, choice))]
pub fn add_choice<S: SceneStore + ?Sized>(
    store: &mut S,
    scene_id: &str,
    id: &str,
    choice_index: usize,
    choice: Choice,
) -> GraphResult<()> {
    let mut dialogues = load_dialogues(store, scene_id)?;
    let index = find_dialogue(&dialogues, scene_id, id)?;
    let dialogue = &mut dialogues[index];
    if choice_index > dialogue.choices.len() {
        return Err(GraphError::ChoiceOutOfRange {
            dialogue_id: dialogue.id.clone(),
            index: choice_index,
            len: dialogue.choices.len(),
        });
    }
    dialogue.choices.insert(choice_index, choice);
    commit(store, scene_id, dialogues)
}

/// Removes one choice. Returns the removed choice.
#[instrument(skip(store))]
pub fn delete_choice<S: SceneStore + ?Sized>(
    store: &mut S,
    scene_id: &str,
    id: &str,
    choice_index: usize,
) -> GraphResult<Choice> {
    let mut dialogues = load_dialogues(store, scene_id)?;
    let index = find_dialogue(&dialogues, scene_id, id)?;
    check_choice_index(&dialogues[index], choice_index)?;
    let removed = dialogues[index].choices.remove(choice_index);
    commit(store, scene_id, dialogues)?;
    Ok(removed)
}

/// Points a choice at another dialogue of the same scene (drag-to-reconnect).
#[instrument(skip(store))]
pub fn reconnect_choice<S: SceneStore + ?Sized>(
    store: &mut S,
    scene_id: &str,
    id: &str,
    choice_index: usize,
    target_id: &str,
) -> GraphResult<()> {
    let mut dialogues = load_dialogues(store, scene_id)?;
    let index = find_dialogue(&dialogues, scene_id, id)?;
    check_choice_index(&dialogues[index], choice_index)?;
    if !dialogues.iter().any(|dialogue| dialogue.id == target_id) {
        return Err(GraphError::InvalidTarget(target_id.to_string()));
    }

    dialogues[index].choices[choice_index].next_dialogue_id = Some(target_id.to_string());
    commit(store, scene_id, dialogues)?;

    info!(dialogue_id = id, choice_index, target_id, "reconnected choice");
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
