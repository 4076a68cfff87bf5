//! Editor session: one state object behind every presentation mode.
//!
//! The session owns the interaction state, the layout cache, the presentation
//! mode and the announcement buffer. Scenes stay in the host's
//! [`SceneStore`]; every call that needs them borrows the store.
//!
//! # Contracts
//! - After any call returns, the selection (if any) points at an existing
//!   dialogue of the session's scene with its current index.
//! - A rejected operation returns `Err` and leaves store, selection and layout
//!   untouched.
//! - Switching presentation mode never changes the scene or the selection.

use tracing::{debug, info, instrument, warn};

use crate::announce::{selection_message, Announcer};
use crate::config::ResolvedConfig;
use crate::error::{GraphError, GraphResult};
use crate::interaction::{dispatch, navigate, Command, InputEvent, InteractionState, Navigation};
use crate::layout::{LayoutDirection, LayoutMode, LayoutState};
use crate::model::{
    speaker_name, Character, Choice, ChoicePatch, DialogueId, DialoguePatch, Scene, SceneId,
};
use crate::mutation;
use crate::presentation::{render, PresentationMode, RenderInput, RenderModel, Theme};
use crate::projection::{project, Point, Projection};
use crate::selection::Selection;
use crate::store::SceneStore;
use crate::validation::{validate, LintIssue, ValidationContext};

/// What the host should do after an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionResponse {
    /// State changed (or a mutation ran).
    Handled,
    /// Nothing to do for this event in the current state.
    Ignored,
    /// Escape with nothing selected: close the editor modal.
    CloseRequested,
}

#[derive(Debug)]
pub struct EditorSession {
    scene_id: SceneId,
    characters: Vec<Character>,
    state: InteractionState,
    layout: LayoutState,
    mode: PresentationMode,
    theme: Theme,
    announcer: Announcer,
}

impl EditorSession {
    /// Opens the editor on `scene_id` with nothing selected.
    pub fn open(
        scene_id: impl Into<SceneId>,
        characters: Vec<Character>,
        config: &ResolvedConfig,
    ) -> Self {
        let scene_id = scene_id.into();
        info!(scene_id = %scene_id, "opening dialogue graph editor");
        Self {
            scene_id,
            characters,
            state: InteractionState::Idle,
            layout: LayoutState::new(config.direction, config.layout_mode, config.spacing),
            mode: config.presentation_mode,
            theme: config.theme,
            announcer: Announcer::with_capacity(config.announcement_capacity),
        }
    }

    /// Modal close: the selection does not outlive the editor.
    pub fn close(&mut self) {
        info!(scene_id = %self.scene_id, "closing dialogue graph editor");
        self.state = InteractionState::Idle;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    #[inline]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.state.selection()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.state.selected_id()
    }

    #[inline]
    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    #[inline]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[inline]
    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    /// The live announcement.
    pub fn announcement(&self) -> Option<&str> {
        self.announcer.live()
    }

    pub fn announcements(&self) -> impl Iterator<Item = &str> {
        self.announcer.history()
    }

    pub fn set_characters(&mut self, characters: Vec<Character>) {
        self.characters = characters;
    }

    fn scene<'s, S: SceneStore + ?Sized>(&self, store: &'s S) -> GraphResult<&'s Scene> {
        store
            .scene(&self.scene_id)
            .ok_or_else(|| GraphError::SceneNotFound(self.scene_id.clone()))
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Routes a pointer or keyboard event through the state machine.
    #[instrument(skip(self, store), fields(scene_id = %self.scene_id))]
    pub fn handle<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
        event: InputEvent,
    ) -> GraphResult<SessionResponse> {
        self.sync(store)?;
        let command = dispatch(&self.state, &event, self.mode.arrow_navigation());
        debug!(?command, "dispatch");

        match command {
            Command::Select(id) => self.select(store, &id).map(|_| SessionResponse::Handled),
            Command::Edit(id) => {
                self.select(store, &id)?;
                self.begin_edit().map(|_| SessionResponse::Handled)
            }
            Command::Deselect => {
                self.deselect();
                Ok(SessionResponse::Handled)
            }
            Command::CloseEditor => self.end_edit().map(|_| SessionResponse::Handled),
            Command::Delete(_) => self.delete_selected(store).map(|_| SessionResponse::Handled),
            Command::Duplicate(_) => self
                .duplicate_selected(store)
                .map(|_| SessionResponse::Handled),
            Command::Navigate(navigation) => self.navigate(store, navigation),
            Command::RequestClose => Ok(SessionResponse::CloseRequested),
            Command::Ignore => Ok(SessionResponse::Ignored),
        }
    }

    fn navigate<S: SceneStore + ?Sized>(
        &mut self,
        store: &S,
        navigation: Navigation,
    ) -> GraphResult<SessionResponse> {
        let scene = self.scene(store)?;
        let target = navigate(
            scene,
            self.layout.result(),
            self.state.selected_id(),
            navigation,
            self.mode.arrow_navigation(),
        );
        match target {
            Some(id) => {
                self.select(store, &id)?;
                Ok(SessionResponse::Handled)
            }
            None => {
                let message = if scene.is_empty() {
                    "Scene has no dialogues"
                } else {
                    "No dialogue in that direction, use Tab to move in order"
                };
                self.announcer.announce(message);
                Ok(SessionResponse::Ignored)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Selects a dialogue of the session's scene and announces it.
    pub fn select<S: SceneStore + ?Sized>(&mut self, store: &S, id: &str) -> GraphResult<()> {
        let scene = self.scene(store)?;
        let selection =
            Selection::of(scene, id).ok_or_else(|| GraphError::dialogue_not_found(&scene.id, id))?;

        let speaker = scene
            .dialogues
            .get(selection.dialogue_index)
            .and_then(|dialogue| speaker_name(&dialogue.speaker, &self.characters));
        let message = selection_message(selection.dialogue_index, scene.len(), speaker);

        self.state = InteractionState::NodeSelected(selection);
        self.announcer.announce(message);
        Ok(())
    }

    pub fn deselect(&mut self) {
        if self.state != InteractionState::Idle {
            self.state = InteractionState::Idle;
            self.announcer.announce("Selection cleared");
        }
    }

    /// Opens the properties editor on the selected dialogue.
    pub fn begin_edit(&mut self) -> GraphResult<()> {
        let selection = self.state.selection().cloned().ok_or(GraphError::NoSelection)?;
        let position = selection.dialogue_index + 1;
        self.state = InteractionState::Editing(selection);
        self.announcer.announce(format!("Editing dialogue {position}"));
        Ok(())
    }

    /// Closes the properties editor, keeping the selection.
    pub fn end_edit(&mut self) -> GraphResult<()> {
        let InteractionState::Editing(selection) = &self.state else {
            return Err(GraphError::NotEditing);
        };
        self.state = InteractionState::NodeSelected(selection.clone());
        self.announcer.announce("Editor closed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Creates an empty dialogue after the selection, or at the end.
    pub fn create_dialogue<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> GraphResult<DialogueId> {
        let after = self.state.selected_id().map(str::to_string);
        let id = mutation::create_dialogue(store, &self.scene_id, after.as_deref())?;
        self.refresh(store)?;
        self.announcer.announce("Dialogue created");
        Ok(id)
    }

    /// Deletes the selected dialogue and returns to `Idle`.
    #[instrument(skip(self, store), fields(scene_id = %self.scene_id))]
    pub fn delete_selected<S: SceneStore + ?Sized>(&mut self, store: &mut S) -> GraphResult<()> {
        let id = self
            .state
            .selected_id()
            .map(str::to_string)
            .ok_or(GraphError::NoSelection)?;
        mutation::delete_dialogue(store, &self.scene_id, &id)?;
        self.state = InteractionState::Idle;
        self.refresh(store)?;
        self.announcer.announce("Dialogue deleted");
        Ok(())
    }

    /// Duplicates the selected dialogue; the selection stays on the original.
    #[instrument(skip(self, store), fields(scene_id = %self.scene_id))]
    pub fn duplicate_selected<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> GraphResult<DialogueId> {
        let id = self
            .state
            .selected_id()
            .map(str::to_string)
            .ok_or(GraphError::NoSelection)?;
        let copy_id = mutation::duplicate_dialogue(store, &self.scene_id, &id)?;
        self.refresh(store)?;
        self.announcer.announce("Dialogue duplicated");
        Ok(copy_id)
    }

    /// Deletes any dialogue by id, clearing the selection if it pointed there.
    pub fn delete_dialogue<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
    ) -> GraphResult<()> {
        mutation::delete_dialogue(store, &self.scene_id, id)?;
        self.refresh(store)
    }

    /// Duplicates any dialogue by id. The selection is not moved.
    pub fn duplicate_dialogue<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
    ) -> GraphResult<DialogueId> {
        let copy_id = mutation::duplicate_dialogue(store, &self.scene_id, id)?;
        self.refresh(store)?;
        Ok(copy_id)
    }

    fn editing_id(&self) -> GraphResult<DialogueId> {
        match &self.state {
            InteractionState::Editing(selection) => Ok(selection.dialogue_id.clone()),
            _ => Err(GraphError::NotEditing),
        }
    }

    /// Properties-editor write to the dialogue being edited.
    pub fn edit_dialogue<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
        patch: &DialoguePatch,
    ) -> GraphResult<()> {
        let id = self.editing_id()?;
        mutation::update_dialogue(store, &self.scene_id, &id, patch)?;
        self.refresh(store)
    }

    /// Properties-editor write to one choice of the dialogue being edited.
    pub fn edit_choice<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
        choice_index: usize,
        patch: &ChoicePatch,
    ) -> GraphResult<()> {
        let id = self.editing_id()?;
        mutation::update_choice(store, &self.scene_id, &id, choice_index, patch)?;
        self.refresh(store)
    }

    pub fn add_choice<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
        choice_index: usize,
        choice: Choice,
    ) -> GraphResult<()> {
        let id = self.editing_id()?;
        mutation::add_choice(store, &self.scene_id, &id, choice_index, choice)?;
        self.refresh(store)
    }

    pub fn delete_choice<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
        choice_index: usize,
    ) -> GraphResult<Choice> {
        let id = self.editing_id()?;
        let removed = mutation::delete_choice(store, &self.scene_id, &id, choice_index)?;
        self.refresh(store)?;
        Ok(removed)
    }

    /// Drag-to-reconnect of a choice handle onto another node.
    pub fn reconnect_choice<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
        choice_index: usize,
        target_id: &str,
    ) -> GraphResult<()> {
        mutation::reconnect_choice(store, &self.scene_id, id, choice_index, target_id)?;
        self.refresh(store)
    }

    /// Re-validates the selection and the layout cache against the store.
    fn refresh<S: SceneStore + ?Sized>(&mut self, store: &S) -> GraphResult<()> {
        let scene = self.scene(store)?;
        let state = self.state.revalidated(scene);
        if state != self.state {
            if state == InteractionState::Idle {
                debug!("selected dialogue is gone, clearing selection");
            }
            self.state = state;
        }
        self.layout.sync(&project(scene));
        Ok(())
    }

    /// Picks up changes made to the store outside this session.
    pub fn sync<S: SceneStore + ?Sized>(&mut self, store: &S) -> GraphResult<()> {
        self.refresh(store)
    }

    // -------------------------------------------------------------------------
    // Layout and presentation
    // -------------------------------------------------------------------------

    /// Explicit "auto layout" action.
    pub fn request_auto_layout(&mut self) -> u64 {
        info!("auto layout requested");
        self.layout.request_auto_layout()
    }

    pub fn set_direction(&mut self, direction: LayoutDirection) {
        self.layout.set_direction(direction);
    }

    pub fn toggle_direction(&mut self) -> LayoutDirection {
        let direction = self.layout.direction().toggled();
        self.layout.set_direction(direction);
        direction
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        self.layout.set_mode(mode);
    }

    /// Manual drag of a node. Kept until the next full layout.
    pub fn move_node(&mut self, id: &str, position: Point) -> bool {
        let moved = self.layout.move_node(id, position);
        if !moved {
            warn!(dialogue_id = id, "drag on a node without a layout position");
        }
        moved
    }

    /// Explicit user switch of the presentation mode.
    pub fn set_mode(&mut self, mode: PresentationMode) {
        if self.mode != mode {
            info!(from = self.mode.label(), to = mode.label(), "presentation mode");
            self.mode = mode;
            self.announcer
                .announce(format!("Presentation mode: {}", mode.label()));
        }
    }

    /// Toolbar shortcut cycling through the modes.
    pub fn cycle_mode(&mut self) -> PresentationMode {
        self.set_mode(self.mode.next());
        self.mode
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Projection of the session's scene with current positions applied.
    pub fn projection<S: SceneStore + ?Sized>(&mut self, store: &S) -> GraphResult<Projection> {
        self.sync(store)?;
        let mut projection = project(self.scene(store)?);
        self.layout.apply_to(&mut projection.nodes);
        Ok(projection)
    }

    /// Render model for the current presentation mode.
    pub fn render<S: SceneStore + ?Sized>(&mut self, store: &S) -> GraphResult<RenderModel> {
        let projection = self.projection(store)?;
        let scene = self.scene(store)?;
        let input = RenderInput {
            scene,
            projection: &projection,
            selection: self.state.selection(),
            characters: &self.characters,
            theme: self.theme,
        };
        Ok(render(self.mode, &input))
    }

    /// Advisory issues of the session's scene. `scenes` resolves cross-scene
    /// targets.
    pub fn validate<S: SceneStore + ?Sized>(
        &self,
        store: &S,
        scenes: &[Scene],
    ) -> GraphResult<Vec<LintIssue>> {
        let scene = self.scene(store)?;
        let context = ValidationContext {
            scenes,
            characters: &self.characters,
        };
        Ok(validate(scene, &context))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
