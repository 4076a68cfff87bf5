//! Graph projection of a scene's dialogue list.
//!
//! The dialogue list stays the single source of truth; this module derives the
//! node/edge view the canvas draws and the layout consumes.
//!
//! # Contracts
//! - **Purity**: [`project`] never mutates its input and returns structurally
//!   identical output for identical input.
//! - **Postcondition**: one node per dialogue, in list order, with
//!   `dialogue_index` equal to the list index.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::model::{ChoiceTransition, Dialogue, DialogueId, Scene, SceneId};

/// Maximum number of characters of choice text shown on an edge label.
pub const EDGE_LABEL_MAX_CHARS: usize = 20;

// =============================================================================
// Geometry
// =============================================================================

/// Position in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// Nodes and edges
// =============================================================================

/// A dialogue as a graph node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: DialogueId,
    /// Left at the origin by the projection; filled in by the layout.
    pub position: Point,
    pub dialogue_index: usize,
    /// Whether the node can be reached from the first dialogue.
    pub reachable: bool,
}

/// Kind of transition an edge stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Choice leaving the scene; `to_id` is the target scene id and is drawn
    /// as a terminal marker.
    SceneJump,
    /// Choice with an explicit intra-scene target.
    DialogueJump,
    /// Implicit advance to the next dialogue index.
    Fallthrough,
    /// Dialogue-level convergence after a branch (explicit target or the
    /// response rule).
    Convergence,
}

impl EdgeKind {
    /// True when both ends of the edge are nodes of the projected scene.
    #[inline]
    pub fn is_intra_scene(self) -> bool {
        !matches!(self, EdgeKind::SceneJump)
    }
}

/// A directed edge of the projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from_id: DialogueId,
    /// Dialogue id, or scene id for [`EdgeKind::SceneJump`].
    pub to_id: String,
    pub kind: EdgeKind,
    /// Index of the choice this edge comes from, if any.
    pub choice_index: Option<usize>,
    /// Shortened choice text.
    pub label: Option<String>,
}

impl GraphEdge {
    fn new(from_id: &str, to_id: &str, kind: EdgeKind) -> Self {
        Self {
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            kind,
            choice_index: None,
            label: None,
        }
    }

    fn from_choice(mut self, choice_index: usize, text: &str) -> Self {
        self.choice_index = Some(choice_index);
        self.label = Some(edge_label(text, choice_index));
        self
    }
}

/// Statistics about a projected scene.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub reachable_nodes: usize,
    pub unreachable_nodes: usize,
    /// Choices with a resolvable transition.
    pub choice_count: usize,
    /// Dialogues offering more than one choice.
    pub branch_count: usize,
    pub scene_exit_count: usize,
    pub edge_count: usize,
}

// =============================================================================
// Projection
// =============================================================================

/// Derived node/edge view of one scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub scene_id: SceneId,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(skip)]
    index: BTreeMap<DialogueId, usize>,
}

/// Projects `scene` into graph nodes and edges.
pub fn project(scene: &Scene) -> Projection {
    let index: BTreeMap<DialogueId, usize> = scene
        .dialogues
        .iter()
        .enumerate()
        .map(|(idx, dialogue)| (dialogue.id.clone(), idx))
        .collect();

    let nodes = scene
        .dialogues
        .iter()
        .enumerate()
        .map(|(idx, dialogue)| GraphNode {
            id: dialogue.id.clone(),
            position: Point::ZERO,
            dialogue_index: idx,
            reachable: false,
        })
        .collect();

    let mut edges = Vec::new();
    for (idx, dialogue) in scene.dialogues.iter().enumerate() {
        edges.extend(dialogue_edges(&scene.dialogues, idx, dialogue, &index));
    }

    let mut projection = Projection {
        scene_id: scene.id.clone(),
        nodes,
        edges,
        index,
    };
    projection.compute_reachability();
    projection
}

fn dialogue_edges(
    dialogues: &[Dialogue],
    idx: usize,
    dialogue: &Dialogue,
    index: &BTreeMap<DialogueId, usize>,
) -> Vec<GraphEdge> {
    let next = dialogues.get(idx + 1);
    let mut edges = Vec::with_capacity(dialogue.choices.len() + 1);

    // Convergence sits beside any choice edges. An explicit target shadows the
    // response rule even when it dangles.
    if let Some(target) = dialogue.convergence_target() {
        if index.contains_key(target) {
            edges.push(GraphEdge::new(&dialogue.id, target, EdgeKind::Convergence));
        }
    } else if dialogue.is_response {
        if let Some(target) = dialogues
            .iter()
            .skip(idx + 1)
            .find(|candidate| !candidate.is_response)
        {
            edges.push(GraphEdge::new(
                &dialogue.id,
                &target.id,
                EdgeKind::Convergence,
            ));
        }
    } else if dialogue.choices.is_empty() {
        if let Some(target) = next {
            edges.push(GraphEdge::new(&dialogue.id, &target.id, EdgeKind::Fallthrough));
        }
    }

    edges.extend(
        dialogue
            .choices
            .iter()
            .enumerate()
            .filter_map(|(choice_idx, choice)| {
                let edge = match choice.transition() {
                    ChoiceTransition::Dialogue(target) => {
                        index.get(target)?;
                        GraphEdge::new(&dialogue.id, target, EdgeKind::DialogueJump)
                    }
                    ChoiceTransition::Scene(scene_id) => {
                        GraphEdge::new(&dialogue.id, scene_id, EdgeKind::SceneJump)
                    }
                    ChoiceTransition::Advance => {
                        GraphEdge::new(&dialogue.id, &next?.id, EdgeKind::Fallthrough)
                    }
                };
                Some(edge.from_choice(choice_idx, &choice.text))
            }),
    );
    edges
}

fn edge_label(text: &str, choice_index: usize) -> String {
    let text = text.trim();
    if text.is_empty() {
        return format!("Choice {}", choice_index + 1);
    }
    if text.chars().count() > EDGE_LABEL_MAX_CHARS {
        let truncated: String = text.chars().take(EDGE_LABEL_MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

impl Projection {
    /// Marks nodes reachable from the first dialogue over intra-scene edges.
    fn compute_reachability(&mut self) {
        let Some(start) = self.nodes.first().map(|node| node.id.clone()) else {
            return;
        };

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        visited.insert(start.clone());
        queue.push_back(start);

        while let Some(node_id) = queue.pop_front() {
            for edge in self.outgoing_edges(&node_id) {
                if edge.kind.is_intra_scene() && visited.insert(edge.to_id.clone()) {
                    queue.push_back(edge.to_id.clone());
                }
            }
        }

        for node in &mut self.nodes {
            node.reachable = visited.contains(&node.id);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Gets a node by dialogue id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).and_then(|idx| self.nodes.get(*idx))
    }

    /// Returns the node's dialogue index.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Ids of all nodes, in dialogue order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }

    /// Gets all outgoing edges from a node.
    pub fn outgoing_edges(&self, id: &str) -> Vec<&GraphEdge> {
        self.edges.iter().filter(|edge| edge.from_id == id).collect()
    }

    /// Gets all incoming intra-scene edges to a node.
    pub fn incoming_edges(&self, id: &str) -> Vec<&GraphEdge> {
        self.edges
            .iter()
            .filter(|edge| edge.kind.is_intra_scene() && edge.to_id == id)
            .collect()
    }

    /// Returns all unreachable node ids.
    pub fn unreachable_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| !node.reachable)
            .map(|node| node.id.as_str())
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let reachable_nodes = self.nodes.iter().filter(|node| node.reachable).count();
        let choice_edges = self.edges.iter().filter(|edge| edge.choice_index.is_some());
        let mut choices_per_node: BTreeMap<&str, usize> = BTreeMap::new();
        for edge in choice_edges.clone() {
            *choices_per_node.entry(edge.from_id.as_str()).or_default() += 1;
        }

        GraphStats {
            total_nodes: self.nodes.len(),
            reachable_nodes,
            unreachable_nodes: self.nodes.len() - reachable_nodes,
            choice_count: choice_edges.count(),
            branch_count: choices_per_node.values().filter(|count| **count > 1).count(),
            scene_exit_count: self
                .edges
                .iter()
                .filter(|edge| edge.kind == EdgeKind::SceneJump)
                .count(),
            edge_count: self.edges.len(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[path = "tests/projection_tests.rs"]
mod tests;
