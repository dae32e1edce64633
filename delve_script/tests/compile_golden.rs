use delve_script::compile;

#[test]
fn minimal_program_compiles_with_user_defaults() {
    let html = compile("init: user: unique_name=\"hero\" at (2,3)").expect("compile ok");
    assert!(html.contains("\"unique_name\": \"hero\""));
    assert!(html.contains("\"position\": [\n      2,\n      3\n    ]"));
    assert!(html.contains("\"health\": 100"));
    assert!(html.contains("\"level\": 1"));
    assert!(html.contains("\"experience\": 0"));
}

#[test]
fn output_is_a_self_contained_document() {
    let html = compile("init: user: unique_name=\"hero\" at (2,3)").expect("compile ok");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.trim_end().ends_with("</html>"));
    assert!(html.contains("<style>"));
    assert!(html.contains("<canvas id=\"game-canvas\">"));
    assert!(html.contains("class DungeonGame"));
    assert!(html.contains("const INITIAL_GAME_STATE = "));
}

#[test]
fn small_world_and_position_survive() {
    let html = compile("init: world: 3 x 5 grid user: unique_name=\"p\" at (1,1)").expect("compile ok");
    assert!(html.contains("\"width\": 3"));
    assert!(html.contains("\"height\": 5"));
    assert!(html.contains("\"position\": [\n      1,\n      1\n    ]"));
}

#[test]
fn compilation_is_deterministic() {
    let src = "let greeting = \"hi\"\n\
               init:\n\
               world: 30 x 30 grid\n\
               user: unique_name=\"hero\" at (2,3)\n\
               mytics:\n\
               mythic-static: unique_name=\"orb\" place at random(25%) can be picked up by the user\n\
               monsters:\n\
               monster-dynamic: unique_name=\"wisp\" place at (8,8) health 3 gives 10 experience\n\
               NPC:\n\
               npc-static: unique_name=\"guide\" place at (4,4) response \"Hello.\" emoji = \"🧝\"\n\
               rules:\n\
               if user has experience > 10 then level up\n\
               quests:\n\
               find_orb: if user has item \"orb\" then talk-static\n\
               end_game:\n\
               if user has item \"orb\" then win the game\n\
               win_the_game: show \"You did it!\"\n\
               on_game_start:\n\
               display_title: \"Wisp Wood\"\n\
               display_text: \"Fetch the orb.\"\n\
               display_link: \"About\", \"https://example.com\"";
    let first = compile(src).expect("compile ok");
    let second = compile(src).expect("compile ok");
    assert_eq!(first, second);
}

#[test]
fn range_furniture_compiles_as_one_entry() {
    let html = compile(
        "init:\n\
         user: unique_name=\"p\" at (5,5)\n\
         furniture:\n\
         wall at (0,0) to (0,9)",
    )
    .expect("compile ok");
    assert!(html.contains("\"type\": \"range\""));
    assert_eq!(html.matches("\"name\": \"wall\"").count(), 1);
}

#[test]
fn random_placement_keeps_its_percentage() {
    let html = compile(
        "init:\n\
         user: unique_name=\"p\" at (5,5)\n\
         items:\n\
         item-heal: unique_name=\"potion\" place at random(40%) can be picked up by the user",
    )
    .expect("compile ok");
    assert!(html.contains("\"type\": \"random\""));
    assert!(html.contains("\"percentage\": 40"));
    // Deferred, not resolved at compile time: the only position in the
    // state is the user's.
    assert_eq!(html.matches("\"position\":").count(), 1);
}

#[test]
fn named_quest_id_comes_from_the_name() {
    let html = compile(
        "init: user: unique_name=\"p\" at (0,0)\n\
         quests:\n\
         find_key: if user has item \"key\" then talk-static",
    )
    .expect("compile ok");
    assert!(html.contains("\"id\": \"find_key\""));
    assert!(!html.contains("\"id\": \"quest_0\""));
}

#[test]
fn multi_word_level_up_action_round_trips() {
    let html = compile(
        "init: user: unique_name=\"p\" at (0,0)\n\
         rules:\n\
         if user has experience > 10 then level up",
    )
    .expect("compile ok");
    assert!(html.contains("\"type\": \"comparison\""));
    assert!(html.contains("\"operator\": \">\""));
    assert!(html.contains("\"type\": \"level up\""));
}
