//! Presentation modes and their pure renderers.
//!
//! All four modes read the same session state; [`render`] only chooses how it
//! is drawn. Switching modes never touches the scene or the selection.

use serde::{Deserialize, Serialize};

use crate::interaction::ArrowNavigation;
use crate::model::{speaker_name, Character, ChoiceTransition, DialogueId, Scene};
use crate::projection::{EdgeKind, Point, Projection};
use crate::selection::Selection;

/// Characters of dialogue text shown on a canvas node.
pub const NODE_TEXT_PREVIEW_CHARS: usize = 80;

// =============================================================================
// Modes and themes
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresentationMode {
    #[default]
    Visual,
    /// Canvas with a focus ring and arrow-key bindings.
    Keyboard,
    HighContrast,
    /// Flat ordered rows, no 2D layout.
    List,
}

impl PresentationMode {
    pub const ALL: [PresentationMode; 4] = [
        PresentationMode::Visual,
        PresentationMode::Keyboard,
        PresentationMode::HighContrast,
        PresentationMode::List,
    ];

    /// Next mode of the toolbar cycle.
    pub fn next(self) -> Self {
        match self {
            PresentationMode::Visual => PresentationMode::Keyboard,
            PresentationMode::Keyboard => PresentationMode::HighContrast,
            PresentationMode::HighContrast => PresentationMode::List,
            PresentationMode::List => PresentationMode::Visual,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PresentationMode::Visual => "visual",
            PresentationMode::Keyboard => "keyboard",
            PresentationMode::HighContrast => "high contrast",
            PresentationMode::List => "list",
        }
    }

    pub fn arrow_navigation(self) -> ArrowNavigation {
        match self {
            PresentationMode::Keyboard => ArrowNavigation::Directional,
            PresentationMode::List => ArrowNavigation::Linear,
            PresentationMode::Visual | PresentationMode::HighContrast => ArrowNavigation::Off,
        }
    }

    #[inline]
    pub fn uses_layout(self) -> bool {
        !matches!(self, PresentationMode::List)
    }
}

/// Canvas theme. Purely decorative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Default,
    Cosmos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    Dots,
    Starfield,
}

impl Theme {
    pub fn background(self) -> Background {
        match self {
            Theme::Default => Background::Dots,
            Theme::Cosmos => Background::Starfield,
        }
    }

    /// Animated layer drawn behind the graph.
    pub fn decorative_layer(self) -> bool {
        matches!(self, Theme::Cosmos)
    }
}

/// Colour tokens handed to the host renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub node_fill: &'static str,
    pub node_border: &'static str,
    pub node_text: &'static str,
    pub selected_border: &'static str,
    pub unreachable_fill: &'static str,
    pub fallthrough_edge: &'static str,
    pub jump_edge: &'static str,
    pub scene_edge: &'static str,
    pub focus_ring: &'static str,
}

impl Palette {
    pub fn standard() -> Self {
        Self {
            node_fill: "#1f2937",
            node_border: "#4b5563",
            node_text: "#e5e7eb",
            selected_border: "#3b82f6",
            unreachable_fill: "#374151",
            fallthrough_edge: "#6b7280",
            jump_edge: "#8b5cf6",
            scene_edge: "#f59e0b",
            focus_ring: "#60a5fa",
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            node_fill: "#000000",
            node_border: "#ffffff",
            node_text: "#ffffff",
            selected_border: "#ffff00",
            unreachable_fill: "#000000",
            fallthrough_edge: "#ffffff",
            jump_edge: "#00ffff",
            scene_edge: "#ffff00",
            focus_ring: "#ffff00",
        }
    }
}

// =============================================================================
// Render model
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: DialogueId,
    pub dialogue_index: usize,
    pub position: Point,
    pub speaker: Option<String>,
    pub text_preview: String,
    pub choice_count: usize,
    pub has_dice_roll: bool,
    pub selected: bool,
    pub reachable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub from_id: DialogueId,
    pub to_id: String,
    pub kind: EdgeKind,
    pub label: Option<String>,
    /// Drawn to a terminal marker instead of a node.
    pub terminal: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    /// Dialogue with the keyboard focus ring.
    pub focus_ring: Option<DialogueId>,
    pub palette: Palette,
    pub background: Background,
    pub decorative_layer: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChoice {
    pub text: String,
    /// Human readable destination.
    pub destination: String,
    pub has_dice_roll: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow {
    pub id: DialogueId,
    pub dialogue_index: usize,
    pub speaker: Option<String>,
    pub text: String,
    pub choices: Vec<ListChoice>,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderModel {
    Canvas(CanvasView),
    List { rows: Vec<ListRow> },
}

impl RenderModel {
    pub fn is_list(&self) -> bool {
        matches!(self, RenderModel::List { .. })
    }
}

/// Everything a renderer may read.
#[derive(Clone, Copy, Debug)]
pub struct RenderInput<'a> {
    pub scene: &'a Scene,
    /// Projection with layout positions applied.
    pub projection: &'a Projection,
    pub selection: Option<&'a Selection>,
    pub characters: &'a [Character],
    pub theme: Theme,
}

// =============================================================================
// Renderers
// =============================================================================

/// Renders `input` with the strategy of `mode`.
pub fn render(mode: PresentationMode, input: &RenderInput<'_>) -> RenderModel {
    match mode {
        PresentationMode::Visual => render_canvas(input, Palette::standard(), false),
        PresentationMode::Keyboard => render_canvas(input, Palette::standard(), true),
        PresentationMode::HighContrast => render_canvas(input, Palette::high_contrast(), false),
        PresentationMode::List => render_list(input),
    }
}

fn selected_id<'a>(input: &RenderInput<'a>) -> Option<&'a str> {
    input
        .selection
        .filter(|selection| selection.scene_id == input.scene.id)
        .map(|selection| selection.dialogue_id.as_str())
}

fn render_canvas(input: &RenderInput<'_>, palette: Palette, focus_ring: bool) -> RenderModel {
    let selected = selected_id(input);
    let nodes = input
        .projection
        .nodes
        .iter()
        .filter_map(|node| {
            let dialogue = input.scene.dialogues.get(node.dialogue_index)?;
            Some(NodeView {
                id: node.id.clone(),
                dialogue_index: node.dialogue_index,
                position: node.position,
                speaker: speaker_name(&dialogue.speaker, input.characters).map(str::to_string),
                text_preview: preview(&dialogue.text, NODE_TEXT_PREVIEW_CHARS),
                choice_count: dialogue.choices.len(),
                has_dice_roll: dialogue.choices.iter().any(|choice| choice.dice_roll.is_some()),
                selected: selected == Some(node.id.as_str()),
                reachable: node.reachable,
            })
        })
        .collect();

    let edges = input
        .projection
        .edges
        .iter()
        .map(|edge| EdgeView {
            from_id: edge.from_id.clone(),
            to_id: edge.to_id.clone(),
            kind: edge.kind,
            label: edge.label.clone(),
            terminal: !edge.kind.is_intra_scene(),
        })
        .collect();

    RenderModel::Canvas(CanvasView {
        nodes,
        edges,
        focus_ring: if focus_ring {
            selected.map(str::to_string)
        } else {
            None
        },
        palette,
        background: input.theme.background(),
        decorative_layer: input.theme.decorative_layer(),
    })
}

fn render_list(input: &RenderInput<'_>) -> RenderModel {
    let selected = selected_id(input);
    let scene = input.scene;
    let rows = scene
        .dialogues
        .iter()
        .enumerate()
        .map(|(idx, dialogue)| ListRow {
            id: dialogue.id.clone(),
            dialogue_index: idx,
            speaker: speaker_name(&dialogue.speaker, input.characters).map(str::to_string),
            text: dialogue.text.clone(),
            choices: dialogue
                .choices
                .iter()
                .map(|choice| ListChoice {
                    text: choice.text.clone(),
                    destination: destination(scene, idx, choice.transition()),
                    has_dice_roll: choice.dice_roll.is_some(),
                })
                .collect(),
            selected: selected == Some(dialogue.id.as_str()),
        })
        .collect();
    RenderModel::List { rows }
}

fn destination(scene: &Scene, idx: usize, transition: ChoiceTransition<'_>) -> String {
    match transition {
        ChoiceTransition::Dialogue(target) => match scene.dialogue_index(target) {
            Some(target_idx) => format!("Dialogue {}", target_idx + 1),
            None => "Missing dialogue".to_string(),
        },
        ChoiceTransition::Scene(scene_id) => scene_label(scene_id),
        ChoiceTransition::Advance if idx + 1 < scene.len() => format!("Dialogue {}", idx + 2),
        ChoiceTransition::Advance => "End of scene".to_string(),
    }
}

fn scene_label(scene_id: &str) -> String {
    format!("Scene {scene_id}")
}

fn preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    } else {
        text.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;
