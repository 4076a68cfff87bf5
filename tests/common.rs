#![allow(dead_code)]

use dialogue_graph_engine::{
    Character, Choice, DiceRoll, Dialogue, EditorSession, InMemorySceneStore, Outcome,
    ResolvedConfig, Scene,
};

pub const SCENE_ID: &str = "s-tavern";

/// `count` narrated lines with no choices.
pub fn linear_scene(count: usize) -> Scene {
    Scene::new(SCENE_ID, "The Tavern").with_dialogues(
        (0..count)
            .map(|idx| {
                Dialogue::new(format!("d{idx}"))
                    .with_speaker("narrator")
                    .with_text(format!("Line {idx}"))
            })
            .collect(),
    )
}

/// A small branching scene: an opener with a persuasion roll, two responses
/// that converge, and an exit to the forest.
pub fn branching_scene() -> Scene {
    let persuade = DiceRoll {
        enabled: true,
        difficulty: 12,
        stat: Some("charisma".to_string()),
        success_outcome: Outcome {
            message: "The innkeeper laughs.".to_string(),
            moral: 1,
            illustration: String::new(),
        },
        failure_outcome: Outcome {
            message: "The innkeeper frowns.".to_string(),
            moral: -1,
            illustration: String::new(),
        },
    };

    Scene::new(SCENE_ID, "The Tavern").with_dialogues(vec![
        Dialogue::new("open")
            .with_speaker("innkeeper")
            .with_text("What brings you here?")
            .with_choice(Choice::new("Ask for a room").with_next_dialogue("room"))
            .with_choice(
                Choice::new("Ask about the caravan")
                    .with_next_dialogue("caravan")
                    .with_dice_roll(persuade),
            ),
        Dialogue {
            is_response: true,
            ..Dialogue::new("room")
                .with_speaker("innkeeper")
                .with_text("Upstairs, second door.")
        },
        Dialogue {
            is_response: true,
            ..Dialogue::new("caravan")
                .with_speaker("innkeeper")
                .with_text("It left at dawn.")
        },
        Dialogue::new("leave")
            .with_speaker("narrator")
            .with_text("You step outside.")
            .with_choice(Choice::new("Head to the forest").with_next_scene("s-forest")),
    ])
}

pub fn characters() -> Vec<Character> {
    vec![
        Character::new("narrator", "Narrator"),
        Character::new("innkeeper", "Marta"),
    ]
}

pub fn store_with(scene: Scene) -> InMemorySceneStore {
    InMemorySceneStore::new(vec![scene, Scene::new("s-forest", "The Forest")])
}

pub fn open_session() -> EditorSession {
    EditorSession::open(SCENE_ID, characters(), &ResolvedConfig::default())
}
