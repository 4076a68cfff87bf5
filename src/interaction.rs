//! Selection and interaction state machine.
//!
//! [`dispatch`] maps an input event in a given state to a [`Command`]; the
//! editor session carries the command out against the scene store. Keyboard
//! targets are resolved by [`navigate`] from the current layout ranks.
//!
//! ```text
//! Idle         --click node / keyboard select-->  NodeSelected
//! NodeSelected --canvas click / Escape / delete-->  Idle
//! NodeSelected --Enter / double click-->            Editing
//! Editing      --Escape / editor closed-->          NodeSelected
//! Editing      --canvas click-->                    Idle
//! ```

use serde::Serialize;

use crate::layout::{LayoutDirection, LayoutResult};
use crate::model::{DialogueId, Scene};
use crate::projection::Point;
use crate::selection::Selection;

// =============================================================================
// Input
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Arrow(Arrow),
    Tab,
    ShiftTab,
    /// Enter, or the `E` shortcut.
    Edit,
    Escape,
    Delete,
    /// Ctrl+D.
    Duplicate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    NodeClicked(DialogueId),
    NodeDoubleClicked(DialogueId),
    CanvasClicked,
    Key(Key),
    /// The properties editor was closed from its own controls.
    EditorClosed,
}

/// How arrow keys move the selection in the active presentation mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrowNavigation {
    Off,
    /// Along layout ranks and orders.
    Directional,
    /// Up/Down through dialogue order.
    Linear,
}

// =============================================================================
// State
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "selection", rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    NodeSelected(Selection),
    /// Properties editor open on the selected dialogue.
    Editing(Selection),
}

impl InteractionState {
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            InteractionState::Idle => None,
            InteractionState::NodeSelected(selection) | InteractionState::Editing(selection) => {
                Some(selection)
            }
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selection()
            .map(|selection| selection.dialogue_id.as_str())
    }

    #[inline]
    pub fn is_editing(&self) -> bool {
        matches!(self, InteractionState::Editing(_))
    }

    /// Same state kind pointing at a re-validated selection, or `Idle` when
    /// the selected dialogue no longer exists.
    pub fn revalidated(&self, scene: &Scene) -> InteractionState {
        match self {
            InteractionState::Idle => InteractionState::Idle,
            InteractionState::NodeSelected(selection) => selection
                .revalidate(scene)
                .map(InteractionState::NodeSelected)
                .unwrap_or_default(),
            InteractionState::Editing(selection) => selection
                .revalidate(scene)
                .map(InteractionState::Editing)
                .unwrap_or_default(),
        }
    }
}

/// What the session has to do in response to an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Select(DialogueId),
    /// Select and open the properties editor.
    Edit(DialogueId),
    Deselect,
    /// Close the properties editor, keeping the selection.
    CloseEditor,
    Delete(DialogueId),
    Duplicate(DialogueId),
    Navigate(Navigation),
    /// Escape with nothing selected: the host should close the editor modal.
    RequestClose,
    Ignore,
}

/// Keyboard movement request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Arrow(Arrow),
    Next,
    Previous,
}

/// Maps `event` in `state` to the command the session must run.
pub fn dispatch(state: &InteractionState, event: &InputEvent, arrows: ArrowNavigation) -> Command {
    match (state, event) {
        (_, InputEvent::NodeClicked(id)) => Command::Select(id.clone()),
        (_, InputEvent::NodeDoubleClicked(id)) => Command::Edit(id.clone()),
        (_, InputEvent::CanvasClicked) => Command::Deselect,

        (InteractionState::Editing(_), InputEvent::EditorClosed)
        | (InteractionState::Editing(_), InputEvent::Key(Key::Escape)) => Command::CloseEditor,
        // Keystrokes belong to the editor's fields while it is open.
        (InteractionState::Editing(_), InputEvent::Key(_)) => Command::Ignore,
        (_, InputEvent::EditorClosed) => Command::Ignore,

        (InteractionState::Idle, InputEvent::Key(Key::Escape)) => Command::RequestClose,
        (InteractionState::NodeSelected(_), InputEvent::Key(Key::Escape)) => Command::Deselect,

        (InteractionState::NodeSelected(selection), InputEvent::Key(Key::Edit)) => {
            Command::Edit(selection.dialogue_id.clone())
        }
        (InteractionState::NodeSelected(selection), InputEvent::Key(Key::Delete)) => {
            Command::Delete(selection.dialogue_id.clone())
        }
        (InteractionState::NodeSelected(selection), InputEvent::Key(Key::Duplicate)) => {
            Command::Duplicate(selection.dialogue_id.clone())
        }
        (InteractionState::Idle, InputEvent::Key(Key::Edit | Key::Delete | Key::Duplicate)) => {
            Command::Ignore
        }

        (_, InputEvent::Key(Key::Tab)) => Command::Navigate(Navigation::Next),
        (_, InputEvent::Key(Key::ShiftTab)) => Command::Navigate(Navigation::Previous),
        (_, InputEvent::Key(Key::Arrow(arrow))) => match arrows {
            ArrowNavigation::Off => Command::Ignore,
            ArrowNavigation::Linear if matches!(arrow, Arrow::Left | Arrow::Right) => {
                Command::Ignore
            }
            _ => Command::Navigate(Navigation::Arrow(*arrow)),
        },
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Resolves the dialogue a keyboard movement lands on.
///
/// With nothing selected, forward movements land on the first dialogue and
/// `Previous` on the last. `Next`/`Previous` wrap around in dialogue order.
/// Arrows return `None` when there is no neighbour in that direction.
pub fn navigate(
    scene: &Scene,
    layout: &LayoutResult,
    current: Option<&str>,
    navigation: Navigation,
    arrows: ArrowNavigation,
) -> Option<DialogueId> {
    let count = scene.len();
    if count == 0 {
        return None;
    }
    let Some(index) = current.and_then(|id| scene.dialogue_index(id)) else {
        let index = match navigation {
            Navigation::Previous => count - 1,
            _ => 0,
        };
        return scene.dialogues.get(index).map(|dialogue| dialogue.id.clone());
    };

    let target = match (navigation, arrows) {
        (Navigation::Next, _) => Some((index + 1) % count),
        (Navigation::Previous, _) => Some((index + count - 1) % count),
        (Navigation::Arrow(Arrow::Up), ArrowNavigation::Linear) => index.checked_sub(1),
        (Navigation::Arrow(Arrow::Down), ArrowNavigation::Linear) => {
            Some(index + 1).filter(|next| *next < count)
        }
        (Navigation::Arrow(arrow), ArrowNavigation::Directional) => {
            let id = &scene.dialogues[index].id;
            return directional_neighbour(layout, id, arrow).map(str::to_string);
        }
        (Navigation::Arrow(_), _) => None,
    };
    target.and_then(|idx| scene.dialogues.get(idx).map(|dialogue| dialogue.id.clone()))
}

/// Coordinate across the rank axis.
fn cross(direction: LayoutDirection, point: Point) -> f32 {
    match direction {
        LayoutDirection::TopToBottom => point.x,
        LayoutDirection::LeftToRight => point.y,
    }
}

/// Nearest node in the pressed direction by rank and order.
fn directional_neighbour<'a>(layout: &'a LayoutResult, id: &str, arrow: Arrow) -> Option<&'a str> {
    let rank = layout.rank(id)?;
    let here = cross(layout.direction, layout.position(id)?);

    // (rank step, cross step): exactly one is non-zero.
    let (rank_step, cross_step): (isize, isize) = match (layout.direction, arrow) {
        (LayoutDirection::TopToBottom, Arrow::Up) | (LayoutDirection::LeftToRight, Arrow::Left) => {
            (-1, 0)
        }
        (LayoutDirection::TopToBottom, Arrow::Down)
        | (LayoutDirection::LeftToRight, Arrow::Right) => (1, 0),
        (LayoutDirection::TopToBottom, Arrow::Left) | (LayoutDirection::LeftToRight, Arrow::Up) => {
            (0, -1)
        }
        (LayoutDirection::TopToBottom, Arrow::Right)
        | (LayoutDirection::LeftToRight, Arrow::Down) => (0, 1),
    };

    let target_rank = if rank_step == 0 {
        rank.rank
    } else {
        next_populated_rank(layout, rank.rank, rank_step)?
    };
    let mut members: Vec<(&str, f32)> = layout
        .rank_members(target_rank)
        .into_iter()
        .filter_map(|(member, _)| {
            layout
                .position(member)
                .map(|point| (member, cross(layout.direction, point)))
        })
        .collect();
    members.sort_by(|a, b| a.1.total_cmp(&b.1));

    if rank_step != 0 {
        return members
            .into_iter()
            .min_by(|a, b| (a.1 - here).abs().total_cmp(&(b.1 - here).abs()))
            .map(|(member, _)| member);
    }

    let slot = members.iter().position(|(member, _)| *member == id)?;
    let next = slot.checked_add_signed(cross_step)?;
    members.get(next).map(|(member, _)| *member)
}

/// First rank past `from` in the `step` direction that has members. Ranks
/// emptied by deletes stay in the cache until the next full layout.
fn next_populated_rank(layout: &LayoutResult, from: usize, step: isize) -> Option<usize> {
    let rank_count = layout.rank_count();
    let mut rank = from;
    loop {
        rank = rank.checked_add_signed(step)?;
        if rank >= rank_count {
            return None;
        }
        if !layout.rank_members(rank).is_empty() {
            return Some(rank);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[path = "tests/interaction_tests.rs"]
mod tests;
