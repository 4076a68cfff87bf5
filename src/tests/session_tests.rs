use super::*;
use crate::interaction::{Arrow, Key};
use crate::model::Dialogue;
use crate::store::InMemorySceneStore;

fn store_of(ids: &[&str]) -> InMemorySceneStore {
    let dialogues = ids
        .iter()
        .map(|id| Dialogue::new(*id).with_speaker("Narrator").with_text("..."))
        .collect();
    InMemorySceneStore::new(vec![Scene::new("s1", "Harbour").with_dialogues(dialogues)])
}

fn session() -> EditorSession {
    EditorSession::open("s1", Vec::new(), &ResolvedConfig::default())
}

fn key(key: Key) -> InputEvent {
    InputEvent::Key(key)
}

fn dialogue_ids(store: &InMemorySceneStore) -> Vec<String> {
    store
        .scene("s1")
        .map(|scene| scene.dialogues.iter().map(|d| d.id.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_delete_selected_clears_selection() {
    let mut store = store_of(&["d1", "d2", "d3"]);
    let mut session = session();

    session
        .handle(&mut store, InputEvent::NodeClicked("d2".to_string()))
        .expect("select");
    assert_eq!(session.selection().map(|s| s.dialogue_index), Some(1));

    session.handle(&mut store, key(Key::Delete)).expect("delete");

    assert_eq!(dialogue_ids(&store), vec!["d1".to_string(), "d3".to_string()]);
    assert_eq!(session.state(), &InteractionState::Idle);
    assert_eq!(session.announcement(), Some("Dialogue deleted"));
}

#[test]
fn test_duplicate_keeps_selection_on_original() {
    let mut store = store_of(&["A", "B"]);
    let mut session = session();
    session.select(&store, "A").expect("select");

    session.handle(&mut store, key(Key::Duplicate)).expect("duplicate");

    let ids = dialogue_ids(&store);
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], "A");
    assert_ne!(ids[1], "A");
    assert_eq!(ids[2], "B");
    assert_eq!(session.selected_id(), Some("A"));
    assert!(matches!(session.state(), InteractionState::NodeSelected(_)));
}

#[test]
fn test_selection_index_follows_external_changes() {
    let mut store = store_of(&["a", "b", "c"]);
    let mut session = session();
    session.select(&store, "c").expect("select");

    mutation::delete_dialogue(&mut store, "s1", "a").expect("external delete");
    session.sync(&store).expect("sync");

    assert_eq!(session.selection().map(|s| s.dialogue_index), Some(1));
}

#[test]
fn test_external_delete_of_selected_clears_it() {
    let mut store = store_of(&["a", "b"]);
    let mut session = session();
    session.select(&store, "b").expect("select");

    session.delete_dialogue(&mut store, "b").expect("delete");
    assert_eq!(session.selection(), None);
}

#[test]
fn test_escape_walks_back_to_close_request() {
    let mut store = store_of(&["a"]);
    let mut session = session();

    session
        .handle(&mut store, InputEvent::NodeDoubleClicked("a".to_string()))
        .expect("edit");
    assert!(session.state().is_editing());

    assert_eq!(
        session.handle(&mut store, key(Key::Escape)),
        Ok(SessionResponse::Handled)
    );
    assert!(matches!(session.state(), InteractionState::NodeSelected(_)));

    session.handle(&mut store, key(Key::Escape)).expect("deselect");
    assert_eq!(session.state(), &InteractionState::Idle);

    assert_eq!(
        session.handle(&mut store, key(Key::Escape)),
        Ok(SessionResponse::CloseRequested)
    );
}

#[test]
fn test_edits_require_open_editor() {
    let mut store = store_of(&["a"]);
    let mut session = session();
    session.select(&store, "a").expect("select");

    let patch = DialoguePatch {
        text: Some("Changed".to_string()),
        ..DialoguePatch::default()
    };
    assert_eq!(
        session.edit_dialogue(&mut store, &patch),
        Err(GraphError::NotEditing)
    );

    session.begin_edit().expect("begin edit");
    session.edit_dialogue(&mut store, &patch).expect("edit");
    session
        .add_choice(&mut store, 0, Choice::new("Onwards"))
        .expect("add choice");
    session
        .edit_choice(
            &mut store,
            0,
            &ChoicePatch {
                text: Some("Onward".to_string()),
                ..ChoicePatch::default()
            },
        )
        .expect("edit choice");

    let scene = store.scene("s1").expect("scene");
    assert_eq!(scene.dialogues[0].text, "Changed");
    assert_eq!(scene.dialogues[0].choices[0].text, "Onward");
    assert!(session.state().is_editing());

    session.end_edit().expect("end edit");
    assert_eq!(session.end_edit(), Err(GraphError::NotEditing));
}

#[test]
fn test_delete_without_selection_is_rejected() {
    let mut store = store_of(&["a"]);
    let mut session = session();
    assert_eq!(session.delete_selected(&mut store), Err(GraphError::NoSelection));
    assert_eq!(
        session.handle(&mut store, key(Key::Delete)),
        Ok(SessionResponse::Ignored)
    );
    assert_eq!(dialogue_ids(&store), vec!["a".to_string()]);
}

#[test]
fn test_create_inserts_after_selection() {
    let mut store = store_of(&["a", "b"]);
    let mut session = session();
    session.select(&store, "a").expect("select");

    let created = session.create_dialogue(&mut store).expect("create");

    assert_eq!(dialogue_ids(&store)[1], created);
    assert_eq!(session.selection().map(|s| s.dialogue_index), Some(0));
    assert!(session.layout().position(&created).is_some());
}

#[test]
fn test_tab_selection_announces_position_and_speaker() {
    let mut store = store_of(&["a", "b", "c"]);
    let mut session = session();

    session.handle(&mut store, key(Key::ShiftTab)).expect("tab");
    assert_eq!(session.selected_id(), Some("c"));
    assert_eq!(
        session.announcement(),
        Some("Dialogue 3 of 3 selected, speaker: Narrator")
    );

    session.handle(&mut store, key(Key::Tab)).expect("tab");
    assert_eq!(session.selected_id(), Some("a"));
}

#[test]
fn test_arrow_without_neighbour_is_announced() {
    let mut store = store_of(&["a", "b"]);
    let mut session = session();
    session.set_mode(PresentationMode::Keyboard);
    session.select(&store, "a").expect("select");

    assert_eq!(
        session.handle(&mut store, key(Key::Arrow(Arrow::Up))),
        Ok(SessionResponse::Ignored)
    );
    assert_eq!(session.selected_id(), Some("a"));
    assert!(session
        .announcement()
        .is_some_and(|message| message.starts_with("No dialogue")));

    session
        .handle(&mut store, key(Key::Arrow(Arrow::Down)))
        .expect("arrow");
    assert_eq!(session.selected_id(), Some("b"));
}

#[test]
fn test_mode_switch_keeps_scene_and_selection() {
    let mut store = store_of(&["a", "b"]);
    let mut session = session();
    session.select(&store, "b").expect("select");
    let revision = store.revision();
    let selection = session.selection().cloned();

    for _ in 0..PresentationMode::ALL.len() {
        session.cycle_mode();
        assert_eq!(session.selection().cloned(), selection);
        let model = session.render(&store).expect("render");
        assert_eq!(model.is_list(), session.mode() == PresentationMode::List);
    }

    assert_eq!(session.mode(), PresentationMode::Visual);
    assert_eq!(store.revision(), revision);
}

#[test]
fn test_list_mode_up_down_walk_rows() {
    let mut store = store_of(&["a", "b", "c"]);
    let mut session = session();
    session.set_mode(PresentationMode::List);

    session
        .handle(&mut store, key(Key::Arrow(Arrow::Down)))
        .expect("first");
    assert_eq!(session.selected_id(), Some("a"));
    session
        .handle(&mut store, key(Key::Arrow(Arrow::Down)))
        .expect("next");
    assert_eq!(session.selected_id(), Some("b"));
    session
        .handle(&mut store, key(Key::Arrow(Arrow::Up)))
        .expect("previous");
    assert_eq!(session.selected_id(), Some("a"));
}

#[test]
fn test_visual_mode_ignores_arrows() {
    let mut store = store_of(&["a", "b"]);
    let mut session = session();
    assert_eq!(
        session.handle(&mut store, key(Key::Arrow(Arrow::Down))),
        Ok(SessionResponse::Ignored)
    );
    assert_eq!(session.selection(), None);
}

#[test]
fn test_manual_drag_survives_edits_until_auto_layout() {
    let mut store = store_of(&["a", "b"]);
    let mut session = session();
    session.sync(&store).expect("sync");
    let dragged = Point::new(900.0, 40.0);
    assert!(session.move_node("b", dragged));

    session
        .reconnect_choice(&mut store, "a", 0, "b")
        .expect_err("no choice yet");
    session.select(&store, "a").expect("select");
    session.begin_edit().expect("edit");
    session
        .add_choice(&mut store, 0, Choice::new("Go"))
        .expect("add choice");
    session
        .reconnect_choice(&mut store, "a", 0, "b")
        .expect("reconnect");
    assert_eq!(session.layout().position("b"), Some(dragged));

    session.request_auto_layout();
    let projection = session.projection(&store).expect("projection");
    let node = projection.node("b").expect("node");
    assert_ne!(node.position, dragged);
}

#[test]
fn test_close_resets_selection() {
    let store = store_of(&["a"]);
    let mut session = session();
    session.select(&store, "a").expect("select");
    session.close();
    assert_eq!(session.selection(), None);
}

#[test]
fn test_unknown_scene_is_an_error() {
    let mut store = store_of(&["a"]);
    let mut session = EditorSession::open("missing", Vec::new(), &ResolvedConfig::default());
    assert_eq!(
        session.handle(&mut store, key(Key::Tab)),
        Err(GraphError::SceneNotFound("missing".to_string()))
    );
}

#[test]
fn test_validate_reports_dangling_after_delete() {
    let mut store = InMemorySceneStore::new(vec![Scene::new("s1", "Harbour").with_dialogues(vec![
        Dialogue::new("a")
            .with_speaker("Narrator")
            .with_text("Go?")
            .with_choice(Choice::new("Yes").with_next_dialogue("b")),
        Dialogue::new("b").with_speaker("Narrator").with_text("Gone"),
    ])]);
    let mut session = session();
    session.select(&store, "b").expect("select");
    session.delete_selected(&mut store).expect("delete");

    let scenes = store.scenes().to_vec();
    let issues = session.validate(&store, &scenes).expect("validate");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, crate::validation::LintCode::DanglingDialogueTarget);
}

#[test]
fn test_arrows_skip_ranks_emptied_by_delete() {
    let mut store = store_of(&["d0", "d1", "d2"]);
    let mut session = session();
    session.set_mode(PresentationMode::Keyboard);
    session.render(&store).expect("render");

    session.delete_dialogue(&mut store, "d1").expect("delete");
    assert_eq!(session.layout().rank("d2").map(|rank| rank.rank), Some(2));
    session.select(&store, "d0").expect("select");

    assert_eq!(
        session.handle(&mut store, key(Key::Arrow(Arrow::Down))),
        Ok(SessionResponse::Handled)
    );
    assert_eq!(session.selected_id(), Some("d2"));

    session
        .handle(&mut store, key(Key::Arrow(Arrow::Up)))
        .expect("arrow up");
    assert_eq!(session.selected_id(), Some("d0"));

    assert_eq!(
        session.handle(&mut store, key(Key::Arrow(Arrow::Up))),
        Ok(SessionResponse::Ignored)
    );
}
