//! The seam between the engine and the externally owned scene store.
//!
//! The engine never holds scenes itself. Each mutation reads the current
//! scene, builds the complete replacement dialogue list and hands it over in a
//! single [`SceneStore::replace_dialogues`] call, so readers never see a
//! half-applied edit.

use crate::model::{Dialogue, Scene, SceneId};

/// Store of scenes owned by the host application.
pub trait SceneStore {
    /// Returns the scene with `scene_id`, if any.
    fn scene(&self, scene_id: &str) -> Option<&Scene>;

    /// Atomically replaces the dialogue list of `scene_id` and notifies
    /// observers. Returns `false` when the scene does not exist.
    fn replace_dialogues(&mut self, scene_id: &str, dialogues: Vec<Dialogue>) -> bool;
}

/// Change notification emitted by [`InMemorySceneStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneChange {
    pub scene_id: SceneId,
    pub revision: u64,
}

/// Simple `Vec`-backed store used by hosts without their own state container
/// and by the test-suite.
#[derive(Clone, Debug, Default)]
pub struct InMemorySceneStore {
    scenes: Vec<Scene>,
    revision: u64,
    changes: Vec<SceneChange>,
}

impl InMemorySceneStore {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            scenes,
            revision: 0,
            changes: Vec::new(),
        }
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Number of accepted writes since creation.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drains the pending change notifications in write order.
    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        std::mem::take(&mut self.changes)
    }
}

impl SceneStore for InMemorySceneStore {
    fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.id == scene_id)
    }

    fn replace_dialogues(&mut self, scene_id: &str, dialogues: Vec<Dialogue>) -> bool {
        let Some(scene) = self.scenes.iter_mut().find(|scene| scene.id == scene_id) else {
            return false;
        };
        scene.dialogues = dialogues;
        self.revision += 1;
        self.changes.push(SceneChange {
            scene_id: scene_id.to_string(),
            revision: self.revision,
        });
        true
    }
}
