//! Single selection pointer of an editor session.

use serde::Serialize;

use crate::model::{DialogueId, Scene, SceneId};

/// Points at one dialogue of one scene.
///
/// # Invariants
/// - `dialogue_index` is the current list index of `dialogue_id` in
///   `scene_id`; [`Selection::revalidate`] restores this after every change of
///   the dialogue list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub scene_id: SceneId,
    pub dialogue_id: DialogueId,
    pub dialogue_index: usize,
}

impl Selection {
    /// Selects `dialogue_id` if it belongs to `scene`.
    pub fn of(scene: &Scene, dialogue_id: &str) -> Option<Self> {
        scene.dialogue_index(dialogue_id).map(|dialogue_index| Self {
            scene_id: scene.id.clone(),
            dialogue_id: dialogue_id.to_string(),
            dialogue_index,
        })
    }

    /// Selects the dialogue at `index` if it exists.
    pub fn at(scene: &Scene, index: usize) -> Option<Self> {
        scene
            .dialogues
            .get(index)
            .and_then(|dialogue| Self::of(scene, &dialogue.id))
    }

    /// Re-targets the pointer to the dialogue's current index, or returns
    /// `None` when the dialogue is gone.
    pub fn revalidate(&self, scene: &Scene) -> Option<Self> {
        if scene.id != self.scene_id {
            return None;
        }
        Self::of(scene, &self.dialogue_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dialogue;

    fn scene() -> Scene {
        Scene::new("s1", "Docks").with_dialogues(vec![
            Dialogue::new("a"),
            Dialogue::new("b"),
            Dialogue::new("c"),
        ])
    }

    #[test]
    fn test_revalidate_follows_index_shift() {
        let mut scene = scene();
        let selection = Selection::of(&scene, "c").expect("selected");
        assert_eq!(selection.dialogue_index, 2);

        scene.dialogues.remove(0);
        let moved = selection.revalidate(&scene).expect("still present");
        assert_eq!(moved.dialogue_index, 1);
        assert_eq!(moved.dialogue_id, "c");
    }

    #[test]
    fn test_revalidate_clears_removed_dialogue() {
        let mut scene = scene();
        let selection = Selection::at(&scene, 1).expect("selected");
        scene.dialogues.remove(1);
        assert_eq!(selection.revalidate(&scene), None);
    }

    #[test]
    fn test_unknown_dialogue_is_not_selectable() {
        assert_eq!(Selection::of(&scene(), "zzz"), None);
        assert_eq!(Selection::at(&scene(), 3), None);
    }
}
