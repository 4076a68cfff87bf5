//! Dialogue graph engine of a node-based interactive-fiction editor.
//!
//! A scene's ordered dialogue list is the single source of truth. The engine
//! projects it into a node/edge graph, lays the graph out in ranks, and routes
//! pointer and keyboard input through one selection state machine to a small
//! mutation API over the host's [`SceneStore`]. Four presentation modes render
//! that same state.

mod announce;
mod config;
mod error;
mod interaction;
mod layout;
mod model;
mod mutation;
mod presentation;
mod projection;
mod selection;
mod session;
mod store;
mod validation;

pub use announce::{selection_message, Announcer, DEFAULT_ANNOUNCEMENT_CAPACITY};
pub use config::{ConfigError, EditorConfig, ResolvedConfig, DEFAULT_SERPENTINE_ROW_SIZE};
pub use error::{GraphError, GraphResult};
pub use interaction::{
    dispatch, navigate, Arrow, ArrowNavigation, Command, InputEvent, InteractionState, Key,
    Navigation,
};
pub use layout::{
    layout, serpentine_layout, LayoutDirection, LayoutMode, LayoutResult, LayoutSpacing,
    LayoutState, NodeRank,
};
pub use model::{
    characters_from_json, new_choice_id, new_dialogue_id, scenes_from_json, speaker_name,
    Character, CharacterRef, Choice, ChoicePatch, ChoiceTransition, DiceRoll, Dialogue,
    DialogueId, DialoguePatch, Effect, EffectOperation, Outcome, Scene, SceneId,
    DICE_DIFFICULTY_MAX, DICE_DIFFICULTY_MIN,
};
pub use mutation::{
    add_choice, create_dialogue, delete_choice, delete_dialogue, duplicate_dialogue,
    reconnect_choice, update_choice, update_dialogue,
};
pub use presentation::{
    render, Background, CanvasView, EdgeView, ListChoice, ListRow, NodeView, Palette,
    PresentationMode, RenderInput, RenderModel, Theme, NODE_TEXT_PREVIEW_CHARS,
};
pub use projection::{
    project, EdgeKind, GraphEdge, GraphNode, GraphStats, Point, Projection, EDGE_LABEL_MAX_CHARS,
};
pub use selection::Selection;
pub use session::{EditorSession, SessionResponse};
pub use store::{InMemorySceneStore, SceneChange, SceneStore};
pub use validation::{validate, LintCode, LintIssue, LintSeverity, ValidationContext};
