use super::*;
use crate::model::{Choice, DiceRoll, Dialogue};
use crate::projection::project;

fn scene() -> Scene {
    Scene::new("s1", "Market").with_dialogues(vec![
        Dialogue::new("d0")
            .with_speaker("c1")
            .with_text("Fresh apples!")
            .with_choice(Choice::new("Buy").with_next_dialogue("d2"))
            .with_choice(
                Choice::new("Haggle")
                    .with_next_scene("s-alley")
                    .with_dice_roll(DiceRoll::default()),
            ),
        Dialogue::new("d1").with_text("Unused line"),
        Dialogue::new("d2").with_speaker("Narrator").with_choice(Choice::new("Leave")),
    ])
}

fn characters() -> Vec<Character> {
    vec![Character::new("c1", "Vendor")]
}

fn canvas(model: RenderModel) -> CanvasView {
    match model {
        RenderModel::Canvas(view) => view,
        RenderModel::List { .. } => panic!("expected a canvas"),
    }
}

#[test]
fn test_canvas_modes_share_nodes_and_differ_in_tokens() {
    let scene = scene();
    let projection = project(&scene);
    let characters = characters();
    let selection = Selection::of(&scene, "d2");
    let input = RenderInput {
        scene: &scene,
        projection: &projection,
        selection: selection.as_ref(),
        characters: &characters,
        theme: Theme::Default,
    };

    let visual = canvas(render(PresentationMode::Visual, &input));
    let keyboard = canvas(render(PresentationMode::Keyboard, &input));
    let contrast = canvas(render(PresentationMode::HighContrast, &input));

    assert_eq!(visual.nodes, keyboard.nodes);
    assert_eq!(visual.nodes, contrast.nodes);
    assert_eq!(visual.focus_ring, None);
    assert_eq!(keyboard.focus_ring.as_deref(), Some("d2"));
    assert_ne!(visual.palette, contrast.palette);
    assert!(visual.nodes[2].selected);
}

#[test]
fn test_canvas_node_details() {
    let scene = scene();
    let projection = project(&scene);
    let characters = characters();
    let input = RenderInput {
        scene: &scene,
        projection: &projection,
        selection: None,
        characters: &characters,
        theme: Theme::Cosmos,
    };

    let view = canvas(render(PresentationMode::Visual, &input));

    assert_eq!(view.nodes[0].speaker.as_deref(), Some("Vendor"));
    assert!(view.nodes[0].has_dice_roll);
    assert_eq!(view.nodes[0].choice_count, 2);
    assert!(!view.nodes[1].reachable);
    assert_eq!(view.background, Background::Starfield);
    assert!(view.decorative_layer);
    let exit = view
        .edges
        .iter()
        .find(|edge| edge.kind == EdgeKind::SceneJump)
        .expect("scene exit edge");
    assert!(exit.terminal);
    assert_eq!(exit.to_id, "s-alley");
}

#[test]
fn test_list_mode_renders_rows_in_order() {
    let scene = scene();
    let projection = project(&scene);
    let characters = characters();
    let selection = Selection::of(&scene, "d1");
    let input = RenderInput {
        scene: &scene,
        projection: &projection,
        selection: selection.as_ref(),
        characters: &characters,
        theme: Theme::Default,
    };

    let RenderModel::List { rows } = render(PresentationMode::List, &input) else {
        panic!("expected a list");
    };

    let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["d0", "d1", "d2"]);
    assert!(rows[1].selected);
    assert_eq!(rows[0].speaker.as_deref(), Some("Vendor"));
    assert_eq!(rows[1].speaker, None);
    assert_eq!(rows[0].choices[0].destination, "Dialogue 3");
    assert_eq!(rows[0].choices[1].destination, "Scene s-alley");
    assert!(rows[0].choices[1].has_dice_roll);
    assert_eq!(rows[2].choices[0].destination, "End of scene");
}

#[test]
fn test_mode_cycle_visits_every_mode() {
    let mut mode = PresentationMode::default();
    let mut seen = Vec::new();
    for _ in 0..PresentationMode::ALL.len() {
        seen.push(mode);
        mode = mode.next();
    }
    assert_eq!(mode, PresentationMode::Visual);
    assert_eq!(seen, PresentationMode::ALL.to_vec());
}

#[test]
fn test_mode_serde_names() {
    let json = serde_json::to_string(&PresentationMode::HighContrast).expect("serialize");
    assert_eq!(json, "\"highContrast\"");
    assert_eq!(
        PresentationMode::List.arrow_navigation(),
        ArrowNavigation::Linear
    );
    assert!(!PresentationMode::List.uses_layout());
}

#[test]
fn test_long_text_is_previewed() {
    let long = "word ".repeat(40);
    let text = preview(&long, 12);
    assert_eq!(text, "word word wo...");
}
