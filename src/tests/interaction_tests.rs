use super::*;
use crate::layout::{layout, LayoutSpacing};
use crate::model::{Choice, Dialogue};
use crate::projection::project;

/// d0 branches to d1 and d2, both fall into d3.
fn diamond() -> Scene {
    Scene::new("s1", "Crossroads").with_dialogues(vec![
        Dialogue::new("d0").with_choice(Choice::new("Left").with_next_dialogue("d1")).with_choice(
            Choice::new("Right").with_next_dialogue("d2"),
        ),
        Dialogue {
            next_dialogue_id: Some("d3".to_string()),
            ..Dialogue::new("d1")
        },
        Dialogue::new("d2"),
        Dialogue::new("d3"),
    ])
}

fn layout_of(scene: &Scene, direction: LayoutDirection) -> LayoutResult {
    layout(&project(scene), direction, &LayoutSpacing::default())
}

fn selected(scene: &Scene, id: &str) -> InteractionState {
    InteractionState::NodeSelected(Selection::of(scene, id).expect("dialogue exists"))
}

// =============================================================================
// dispatch
// =============================================================================

#[test]
fn test_click_selects_and_canvas_click_deselects() {
    let scene = diamond();
    assert_eq!(
        dispatch(
            &InteractionState::Idle,
            &InputEvent::NodeClicked("d2".to_string()),
            ArrowNavigation::Off
        ),
        Command::Select("d2".to_string())
    );
    assert_eq!(
        dispatch(&selected(&scene, "d2"), &InputEvent::CanvasClicked, ArrowNavigation::Off),
        Command::Deselect
    );
}

#[test]
fn test_escape_depends_on_state() {
    let scene = diamond();
    let escape = InputEvent::Key(Key::Escape);
    let editing = InteractionState::Editing(Selection::of(&scene, "d1").expect("exists"));

    assert_eq!(
        dispatch(&InteractionState::Idle, &escape, ArrowNavigation::Off),
        Command::RequestClose
    );
    assert_eq!(
        dispatch(&selected(&scene, "d1"), &escape, ArrowNavigation::Off),
        Command::Deselect
    );
    assert_eq!(dispatch(&editing, &escape, ArrowNavigation::Off), Command::CloseEditor);
}

#[test]
fn test_selected_node_commands() {
    let scene = diamond();
    let state = selected(&scene, "d0");
    let key = |key| dispatch(&state, &InputEvent::Key(key), ArrowNavigation::Directional);

    assert_eq!(key(Key::Delete), Command::Delete("d0".to_string()));
    assert_eq!(key(Key::Duplicate), Command::Duplicate("d0".to_string()));
    assert_eq!(key(Key::Edit), Command::Edit("d0".to_string()));
    assert_eq!(key(Key::Tab), Command::Navigate(Navigation::Next));
    assert_eq!(
        key(Key::Arrow(Arrow::Down)),
        Command::Navigate(Navigation::Arrow(Arrow::Down))
    );
}

#[test]
fn test_editing_swallows_keys() {
    let scene = diamond();
    let editing = InteractionState::Editing(Selection::of(&scene, "d0").expect("exists"));
    for key in [Key::Delete, Key::Duplicate, Key::Tab, Key::Arrow(Arrow::Up)] {
        assert_eq!(
            dispatch(&editing, &InputEvent::Key(key), ArrowNavigation::Directional),
            Command::Ignore
        );
    }
    assert_eq!(
        dispatch(&editing, &InputEvent::EditorClosed, ArrowNavigation::Off),
        Command::CloseEditor
    );
}

#[test]
fn test_idle_ignores_node_commands() {
    for key in [Key::Delete, Key::Duplicate, Key::Edit] {
        assert_eq!(
            dispatch(&InteractionState::Idle, &InputEvent::Key(key), ArrowNavigation::Directional),
            Command::Ignore
        );
    }
}

#[test]
fn test_arrow_bindings_follow_mode() {
    let up = InputEvent::Key(Key::Arrow(Arrow::Up));
    let left = InputEvent::Key(Key::Arrow(Arrow::Left));
    let idle = InteractionState::Idle;

    assert_eq!(dispatch(&idle, &up, ArrowNavigation::Off), Command::Ignore);
    assert_eq!(
        dispatch(&idle, &up, ArrowNavigation::Linear),
        Command::Navigate(Navigation::Arrow(Arrow::Up))
    );
    assert_eq!(dispatch(&idle, &left, ArrowNavigation::Linear), Command::Ignore);
}

#[test]
fn test_revalidated_state_drops_deleted_selection() {
    let mut scene = diamond();
    let state = selected(&scene, "d2");
    scene.dialogues.remove(2);
    assert_eq!(state.revalidated(&scene), InteractionState::Idle);

    let state = selected(&scene, "d3");
    scene.dialogues.remove(0);
    assert_eq!(
        state.revalidated(&scene).selection().map(|s| s.dialogue_index),
        Some(1)
    );
}

// =============================================================================
// navigate
// =============================================================================

#[test]
fn test_tab_cycles_with_wrap() {
    let scene = diamond();
    let layout = layout_of(&scene, LayoutDirection::TopToBottom);
    let nav = |current, navigation| {
        navigate(&scene, &layout, current, navigation, ArrowNavigation::Directional)
    };

    assert_eq!(nav(None, Navigation::Next).as_deref(), Some("d0"));
    assert_eq!(nav(None, Navigation::Previous).as_deref(), Some("d3"));
    assert_eq!(nav(Some("d3"), Navigation::Next).as_deref(), Some("d0"));
    assert_eq!(nav(Some("d0"), Navigation::Previous).as_deref(), Some("d3"));
    assert_eq!(nav(Some("d1"), Navigation::Next).as_deref(), Some("d2"));
}

#[test]
fn test_top_down_arrows_follow_ranks() {
    let scene = diamond();
    let layout = layout_of(&scene, LayoutDirection::TopToBottom);
    let arrow = |current: &str, arrow| {
        navigate(
            &scene,
            &layout,
            Some(current),
            Navigation::Arrow(arrow),
            ArrowNavigation::Directional,
        )
    };

    assert_eq!(arrow("d0", Arrow::Down).as_deref(), Some("d1"));
    assert_eq!(arrow("d1", Arrow::Right).as_deref(), Some("d2"));
    assert_eq!(arrow("d2", Arrow::Left).as_deref(), Some("d1"));
    assert_eq!(arrow("d2", Arrow::Down).as_deref(), Some("d3"));
    assert_eq!(arrow("d3", Arrow::Up).as_deref(), Some("d1"));
    assert_eq!(arrow("d0", Arrow::Up), None);
    assert_eq!(arrow("d2", Arrow::Right), None);
}

#[test]
fn test_left_to_right_swaps_arrow_axes() {
    let scene = diamond();
    let layout = layout_of(&scene, LayoutDirection::LeftToRight);
    let arrow = |current: &str, arrow| {
        navigate(
            &scene,
            &layout,
            Some(current),
            Navigation::Arrow(arrow),
            ArrowNavigation::Directional,
        )
    };

    assert_eq!(arrow("d0", Arrow::Right).as_deref(), Some("d1"));
    assert_eq!(arrow("d1", Arrow::Down).as_deref(), Some("d2"));
    assert_eq!(arrow("d3", Arrow::Left).as_deref(), Some("d1"));
    assert_eq!(arrow("d0", Arrow::Down), None);
}

#[test]
fn test_linear_arrows_walk_the_list() {
    let scene = diamond();
    let layout = LayoutResult::default();
    let arrow = |current: &str, arrow| {
        navigate(
            &scene,
            &layout,
            Some(current),
            Navigation::Arrow(arrow),
            ArrowNavigation::Linear,
        )
    };

    assert_eq!(arrow("d1", Arrow::Down).as_deref(), Some("d2"));
    assert_eq!(arrow("d1", Arrow::Up).as_deref(), Some("d0"));
    assert_eq!(arrow("d0", Arrow::Up), None);
    assert_eq!(arrow("d3", Arrow::Down), None);
}

#[test]
fn test_navigate_empty_scene() {
    let scene = Scene::new("s1", "Empty");
    assert_eq!(
        navigate(
            &scene,
            &LayoutResult::default(),
            None,
            Navigation::Next,
            ArrowNavigation::Directional
        ),
        None
    );
}
