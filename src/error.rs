use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Invalid operations rejected by the mutation API and the editor session.
///
/// Every variant leaves the scene store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GraphError {
    #[error("scene `{0}` not found")]
    #[diagnostic(code("graph.scene_not_found"))]
    SceneNotFound(String),
    #[error("dialogue `{dialogue_id}` not found in scene `{scene_id}`")]
    #[diagnostic(
        code("graph.dialogue_not_found"),
        help("the dialogue may have been deleted by an earlier action")
    )]
    DialogueNotFound {
        scene_id: String,
        dialogue_id: String,
    },
    #[error("choice index {index} out of range for dialogue `{dialogue_id}` ({len} choices)")]
    #[diagnostic(code("graph.choice_out_of_range"))]
    ChoiceOutOfRange {
        dialogue_id: String,
        index: usize,
        len: usize,
    },
    #[error("reconnect target `{0}` is not a dialogue of this scene")]
    #[diagnostic(code("graph.invalid_target"))]
    InvalidTarget(String),
    #[error("no dialogue is selected")]
    #[diagnostic(code("graph.no_selection"))]
    NoSelection,
    #[error("properties editor is not open")]
    #[diagnostic(code("graph.not_editing"))]
    NotEditing,
    #[error("scene store rejected the update for scene `{0}`")]
    #[diagnostic(code("graph.store_rejected"))]
    StoreRejected(String),
    #[error("invalid scene data: {message}")]
    #[diagnostic(code("graph.serialization"))]
    Serialization {
        message: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },
}

impl GraphError {
    pub(crate) fn dialogue_not_found(scene_id: &str, dialogue_id: &str) -> Self {
        GraphError::DialogueNotFound {
            scene_id: scene_id.to_string(),
            dialogue_id: dialogue_id.to_string(),
        }
    }
}
