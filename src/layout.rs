//! Layered layout of a projected scene.
//!
//! Nodes are ranked by longest-path distance from the root candidates and
//! ordered by dialogue index within a rank. Back edges found by a depth-first
//! walk are left out of the rank computation, so cyclic scenes terminate.
//!
//! # Contracts
//! - **Determinism**: [`layout`] is a pure function of its inputs.
//! - **Transposition**: `LeftToRight` keeps every node's rank and order and
//!   only swaps which screen axis each runs along. Steps follow the node
//!   footprint on that axis, so the configured gaps hold in both directions.
//! - Positions are only recomputed when the [`LayoutState`] version token moves.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::DialogueId;
use crate::projection::{GraphNode, Point, Projection};

// =============================================================================
// Parameters
// =============================================================================

/// Axis along which ranks grow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutDirection {
    #[default]
    #[serde(rename = "TB")]
    TopToBottom,
    #[serde(rename = "LR")]
    LeftToRight,
}

impl LayoutDirection {
    pub fn toggled(self) -> Self {
        match self {
            LayoutDirection::TopToBottom => LayoutDirection::LeftToRight,
            LayoutDirection::LeftToRight => LayoutDirection::TopToBottom,
        }
    }
}

/// Node footprint and gaps, in graph units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpacing {
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between neighbours of the same rank.
    pub node_gap: f32,
    /// Gap between consecutive ranks.
    pub rank_gap: f32,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self {
            node_width: 320.0,
            node_height: 140.0,
            node_gap: 80.0,
            rank_gap: 220.0,
        }
    }
}

impl LayoutSpacing {
    /// Distance between neighbours of one rank, and between consecutive
    /// ranks, measured along the axes `direction` puts them on.
    pub fn steps(&self, direction: LayoutDirection) -> (f32, f32) {
        match direction {
            LayoutDirection::TopToBottom => (
                self.node_width + self.node_gap,
                self.node_height + self.rank_gap,
            ),
            LayoutDirection::LeftToRight => (
                self.node_height + self.node_gap,
                self.node_width + self.rank_gap,
            ),
        }
    }
}

// =============================================================================
// Result
// =============================================================================

/// Layer coordinates of a node, used for keyboard navigation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeRank {
    pub rank: usize,
    pub order: usize,
}

/// Output of a layout pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Axis along which ranks grow.
    pub direction: LayoutDirection,
    pub positions: BTreeMap<DialogueId, Point>,
    pub ranks: BTreeMap<DialogueId, NodeRank>,
    /// Edges ignored for ranking because they close a cycle.
    pub back_edges: Vec<(DialogueId, DialogueId)>,
}

impl LayoutResult {
    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    pub fn rank(&self, id: &str) -> Option<NodeRank> {
        self.ranks.get(id).copied()
    }

    /// Ids in `rank`, sorted by order.
    pub fn rank_members(&self, rank: usize) -> Vec<(&str, usize)> {
        let mut members: Vec<(&str, usize)> = self
            .ranks
            .iter()
            .filter(|(_, node_rank)| node_rank.rank == rank)
            .map(|(id, node_rank)| (id.as_str(), node_rank.order))
            .collect();
        members.sort_by_key(|(_, order)| *order);
        members
    }

    pub fn rank_count(&self) -> usize {
        self.ranks
            .values()
            .map(|node_rank| node_rank.rank + 1)
            .max()
            .unwrap_or(0)
    }
}

// =============================================================================
// Layered layout
// =============================================================================

/// Computes layered positions for every node of `projection`.
pub fn layout(
    projection: &Projection,
    direction: LayoutDirection,
    spacing: &LayoutSpacing,
) -> LayoutResult {
    let count = projection.len();
    if count == 0 {
        return LayoutResult {
            direction,
            ..LayoutResult::default()
        };
    }

    let adjacency = intra_scene_adjacency(projection);
    let back_edges = find_back_edges(&adjacency);
    let levels = longest_path_levels(&adjacency, &back_edges);

    let mut layers: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, level) in levels.iter().enumerate() {
        layers.entry(*level).or_default().push(idx);
    }

    let (order_step, rank_step) = spacing.steps(direction);
    let mut positions = BTreeMap::new();
    let mut ranks = BTreeMap::new();
    for (rank, layer) in &layers {
        let centre = (layer.len() as f32 - 1.0) / 2.0;
        for (order, idx) in layer.iter().enumerate() {
            let id = projection.nodes[*idx].id.clone();
            let along_order = (order as f32 - centre) * order_step;
            let along_rank = *rank as f32 * rank_step;
            let position = match direction {
                LayoutDirection::TopToBottom => Point::new(along_order, along_rank),
                LayoutDirection::LeftToRight => Point::new(along_rank, along_order),
            };
            positions.insert(id.clone(), position);
            ranks.insert(
                id,
                NodeRank {
                    rank: *rank,
                    order,
                },
            );
        }
    }

    debug!(
        nodes = count,
        ranks = layers.len(),
        back_edges = back_edges.len(),
        "computed layered layout"
    );

    LayoutResult {
        direction,
        positions,
        ranks,
        back_edges: back_edges
            .into_iter()
            .map(|(from, to)| {
                (
                    projection.nodes[from].id.clone(),
                    projection.nodes[to].id.clone(),
                )
            })
            .collect(),
    }
}

/// Successor lists by dialogue index, deduplicated, scene exits dropped.
fn intra_scene_adjacency(projection: &Projection) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); projection.len()];
    for edge in projection.edges.iter().filter(|edge| edge.kind.is_intra_scene()) {
        if let (Some(from), Some(to)) = (
            projection.index_of(&edge.from_id),
            projection.index_of(&edge.to_id),
        ) {
            adjacency[from].insert(to);
        }
    }
    adjacency
        .into_iter()
        .map(|targets| targets.into_iter().collect())
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnStack,
    Done,
}

/// Depth-first walk from the roots (nodes without incoming edges, or the first
/// dialogue when every node has one), then from any node still unvisited, in
/// dialogue order. Returns the edges pointing back onto the walk stack.
fn find_back_edges(adjacency: &[Vec<usize>]) -> BTreeSet<(usize, usize)> {
    let count = adjacency.len();
    let mut has_incoming = vec![false; count];
    for targets in adjacency {
        for target in targets {
            has_incoming[*target] = true;
        }
    }

    let mut starts: Vec<usize> = (0..count).filter(|idx| !has_incoming[*idx]).collect();
    if starts.is_empty() {
        starts.push(0);
    }
    starts.extend(0..count);

    let mut state = vec![Visit::New; count];
    let mut back_edges = BTreeSet::new();

    for start in starts {
        if state[start] != Visit::New {
            continue;
        }
        // (node, next successor slot)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        state[start] = Visit::OnStack;

        while let Some((node, slot)) = stack.last_mut() {
            let node = *node;
            let Some(target) = adjacency[node].get(*slot).copied() else {
                state[node] = Visit::Done;
                stack.pop();
                continue;
            };
            *slot += 1;
            match state[target] {
                Visit::New => {
                    state[target] = Visit::OnStack;
                    stack.push((target, 0));
                }
                Visit::OnStack => {
                    back_edges.insert((node, target));
                }
                Visit::Done => {}
            }
        }
    }

    back_edges
}

/// Longest-path level of every node over the acyclic remainder of the graph.
fn longest_path_levels(
    adjacency: &[Vec<usize>],
    back_edges: &BTreeSet<(usize, usize)>,
) -> Vec<usize> {
    let count = adjacency.len();
    let forward: Vec<Vec<usize>> = adjacency
        .iter()
        .enumerate()
        .map(|(from, targets)| {
            targets
                .iter()
                .copied()
                .filter(|to| !back_edges.contains(&(from, *to)))
                .collect()
        })
        .collect();

    let mut indegree = vec![0_usize; count];
    for targets in &forward {
        for to in targets {
            indegree[*to] += 1;
        }
    }

    let mut levels = vec![0_usize; count];
    let mut queue: VecDeque<usize> = (0..count).filter(|idx| indegree[*idx] == 0).collect();
    while let Some(node) = queue.pop_front() {
        for &target in &forward[node] {
            levels[target] = levels[target].max(levels[node] + 1);
            indegree[target] -= 1;
            if indegree[target] == 0 {
                queue.push_back(target);
            }
        }
    }

    debug_assert!(
        indegree.iter().all(|degree| *degree == 0),
        "back-edge removal must leave an acyclic graph"
    );
    levels
}

// =============================================================================
// Serpentine layout
// =============================================================================

/// Wraps nodes, in dialogue order, into rows of `row_size`; odd rows run right
/// to left so reading order follows an S shape. Ranks become
/// `(row, position in row)`.
pub fn serpentine_layout(
    projection: &Projection,
    row_size: usize,
    spacing: &LayoutSpacing,
) -> LayoutResult {
    let row_size = row_size.max(1);
    let widest_row = projection.len().min(row_size);
    let (order_step, rank_step) = spacing.steps(LayoutDirection::TopToBottom);
    let right_edge = widest_row.saturating_sub(1) as f32 * order_step;

    let mut positions = BTreeMap::new();
    let mut ranks = BTreeMap::new();
    for (idx, node) in projection.nodes.iter().enumerate() {
        let row = idx / row_size;
        let order = idx % row_size;
        let offset = order as f32 * order_step;
        let x = if row % 2 == 1 {
            right_edge - offset
        } else {
            offset
        };
        positions.insert(
            node.id.clone(),
            Point::new(x, row as f32 * rank_step),
        );
        ranks.insert(node.id.clone(), NodeRank { rank: row, order });
    }

    // Rows stack downwards like top-to-bottom ranks.
    LayoutResult {
        direction: LayoutDirection::TopToBottom,
        positions,
        ranks,
        back_edges: Vec::new(),
    }
}

// =============================================================================
// Cached layout with version token
// =============================================================================

/// Which algorithm places the nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LayoutMode {
    #[default]
    Layered,
    Serpentine { row_size: usize },
}

/// Layout cache owned by an editor session.
///
/// Positions survive data changes; only a bump of the version token recomputes
/// them (discarding manual drags). The token moves on an explicit auto-layout
/// request, on a direction or mode change, and when [`LayoutState::sync`] sees
/// a node that has no position yet.
#[derive(Clone, Debug)]
pub struct LayoutState {
    version: u64,
    computed_version: Option<u64>,
    direction: LayoutDirection,
    mode: LayoutMode,
    spacing: LayoutSpacing,
    result: LayoutResult,
    manual: BTreeMap<DialogueId, Point>,
}

impl LayoutState {
    pub fn new(direction: LayoutDirection, mode: LayoutMode, spacing: LayoutSpacing) -> Self {
        Self {
            version: 0,
            computed_version: None,
            direction,
            mode,
            spacing,
            result: LayoutResult::default(),
            manual: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    #[inline]
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    #[inline]
    pub fn result(&self) -> &LayoutResult {
        &self.result
    }

    /// Requests a full recomputation on the next sync.
    pub fn request_auto_layout(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    pub fn set_direction(&mut self, direction: LayoutDirection) {
        if self.direction != direction {
            self.direction = direction;
            self.request_auto_layout();
        }
    }

    pub fn set_mode(&mut self, mode: LayoutMode) {
        if self.mode != mode {
            self.mode = mode;
            self.request_auto_layout();
        }
    }

    /// Records a dragged position. Unknown ids are ignored.
    pub fn move_node(&mut self, id: &str, position: Point) -> bool {
        if !self.result.positions.contains_key(id) {
            return false;
        }
        self.manual.insert(id.to_string(), position);
        true
    }

    /// Brings the cache in line with `projection`. Returns `true` when the
    /// positions were recomputed.
    pub fn sync(&mut self, projection: &Projection) -> bool {
        let has_new_node = projection
            .node_ids()
            .any(|id| !self.result.positions.contains_key(id));
        if has_new_node && self.computed_version == Some(self.version) {
            self.request_auto_layout();
        }

        if self.computed_version != Some(self.version) {
            self.result = match self.mode {
                LayoutMode::Layered => layout(projection, self.direction, &self.spacing),
                LayoutMode::Serpentine { row_size } => {
                    serpentine_layout(projection, row_size, &self.spacing)
                }
            };
            self.manual.clear();
            self.computed_version = Some(self.version);
            return true;
        }

        // Deleted nodes drop out; everything else keeps its place.
        self.result
            .positions
            .retain(|id, _| projection.index_of(id).is_some());
        self.result
            .ranks
            .retain(|id, _| projection.index_of(id).is_some());
        self.result.back_edges.retain(|(from, to)| {
            projection.index_of(from).is_some() && projection.index_of(to).is_some()
        });
        self.manual.retain(|id, _| projection.index_of(id).is_some());
        false
    }

    /// Current position of a node, manual drags first.
    pub fn position(&self, id: &str) -> Option<Point> {
        self.manual
            .get(id)
            .copied()
            .or_else(|| self.result.position(id))
    }

    pub fn rank(&self, id: &str) -> Option<NodeRank> {
        self.result.rank(id)
    }

    /// Copies the current positions onto `nodes`.
    pub fn apply_to(&self, nodes: &mut [GraphNode]) {
        for node in nodes {
            if let Some(position) = self.position(&node.id) {
                node.position = position;
            }
        }
    }
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new(
            LayoutDirection::default(),
            LayoutMode::default(),
            LayoutSpacing::default(),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[path = "tests/layout_tests.rs"]
mod tests;
