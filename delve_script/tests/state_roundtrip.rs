use delve_data::GameState;
use delve_script::compile;

/// Slice the `INITIAL_GAME_STATE` JSON literal out of a generated document.
fn state_json(html: &str) -> &str {
    let marker = "const INITIAL_GAME_STATE = ";
    let start = html.find(marker).expect("state literal present") + marker.len();
    let end = html[start..].find(";\n").expect("terminated literal") + start;
    &html[start..end]
}

const FULL_SRC: &str = "let difficulty = 2\n\
    let title = \"Wisp Wood\"\n\
    init:\n\
    world: 40 x 40 grid\n\
    llm:\n\
    endpoint \"http://localhost:8080/v1/chat\"\n\
    token \"tok\"\n\
    furniture:\n\
    grass at all\n\
    wall at (0,0) to (0,9)\n\
    mytics:\n\
    mythic-static: unique_name=\"orb\" place at (12,12) can be picked up by the user catch \"It resists.\"\n\
    items:\n\
    item-heal: unique_name=\"potion\" place at random(40%) can be picked up by the user\n\
    item-weapon: unique_name=\"sword\" place at (3,4) damage 5 can be picked up by the user\n\
    monsters:\n\
    monster-dynamic: unique_name=\"wisp\" place at (8,8) health 3 gives 10 experience\n\
    monster-boss: unique_name=\"dragon\" place at (30,30) killable 12 hit gives 100 experience\n\
    user:\n\
    unique_name=\"hero\" context \"a brave soul\" at (2,3)\n\
    NPC:\n\
    npc-static: unique_name=\"guide\" place at (4,4) response \"Go north.\" emoji = \"🧝\"\n\
    npc-dynamic: unique_name=\"oracle\" context \"speaks in riddles\" agenda \"hint at the orb\" if user has item \"orb\" then response \"You found it!\"\n\
    rules:\n\
    if user has experience > 10 then level up\n\
    quests:\n\
    find_orb: if user has item \"orb\" then talk-static\n\
    end_game:\n\
    if user has item \"orb\" and user is at (2,3) then win the game\n\
    if user has health <= 0 then die and lose the game\n\
    win_the_game: show \"You did it!\"\n\
    lose_the_game: show \"The wood claims you.\"\n\
    on_game_start:\n\
    display_title: \"Wisp Wood\"\n\
    display_text: \"Fetch the orb.\"\n\
    display_link: \"About\", \"https://example.com\"";

#[test]
fn top_level_keys_are_exactly_the_schema() {
    let html = compile(FULL_SRC).expect("compile ok");
    let value: serde_json::Value = serde_json::from_str(state_json(&html)).expect("valid JSON");
    let object = value.as_object().expect("top-level object");

    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    let mut expected = vec![
        "world",
        "user",
        "terrain",
        "furniture",
        "mythics",
        "items",
        "monsters",
        "npcs",
        "variables",
        "quests",
        "rules",
        "end_game",
        "on_game_start",
    ];
    expected.sort_unstable();
    assert_eq!(keys, expected);
}

#[test]
fn state_parses_back_into_the_shared_model() {
    let html = compile(FULL_SRC).expect("compile ok");
    let state: GameState = serde_json::from_str(state_json(&html)).expect("schema round-trips");

    assert_eq!(state.world.width, 40);
    assert_eq!(state.user.unique_name, "hero");
    assert_eq!(state.user.position, [2, 3]);
    assert_eq!(state.furniture.len(), 2);
    assert_eq!(state.mythics[0].catch_message, "It resists.");
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.items[1].damage, 5);
    assert_eq!(state.monsters[1].health, 12);
    assert_eq!(state.npcs.len(), 2);
    assert_eq!(state.npcs[1].conditions.len(), 1);
    assert_eq!(state.variables.len(), 2);
    assert_eq!(state.variables[0].0, "difficulty");
    assert_eq!(state.quests[0].id, "find_orb");
    assert_eq!(state.rules[0].id, "rule_0");

    let end_game = state.end_game.expect("end_game section");
    // Two and-joined win conditions flattened plus one lose condition.
    assert_eq!(end_game.conditions.len(), 3);
    assert_eq!(end_game.win_message.as_deref(), Some("You did it!"));

    let splash = state.on_game_start.expect("splash section");
    assert_eq!(splash.title.as_deref(), Some("Wisp Wood"));
    assert_eq!(splash.links.len(), 1);
}

#[test]
fn empty_sections_serialise_as_empty_objects() {
    let html = compile("init: user: unique_name=\"p\" at (0,0)").expect("compile ok");
    let value: serde_json::Value = serde_json::from_str(state_json(&html)).expect("valid JSON");
    assert_eq!(value["end_game"], serde_json::json!({}));
    assert_eq!(value["on_game_start"], serde_json::json!({}));
    assert_eq!(value["terrain"], serde_json::json!({}));
}

#[test]
fn variables_carry_their_literal_types() {
    let html = compile(
        "let lives = 3\n\
         let hero = \"Ada\"\n\
         let hardcore = true\n\
         let speed = 1.5\n\
         init: user: unique_name=\"p\" at (0,0)",
    )
    .expect("compile ok");
    let value: serde_json::Value = serde_json::from_str(state_json(&html)).expect("valid JSON");
    assert_eq!(value["variables"]["lives"], serde_json::json!(3));
    assert_eq!(value["variables"]["hero"], serde_json::json!("Ada"));
    assert_eq!(value["variables"]["hardcore"], serde_json::json!(true));
    assert_eq!(value["variables"]["speed"], serde_json::json!(1.5));
}

#[test]
fn save_file_envelope_wraps_the_same_schema() {
    let html = compile(FULL_SRC).expect("compile ok");
    let state: GameState = serde_json::from_str(state_json(&html)).expect("schema round-trips");

    let save = delve_data::SaveFile {
        version: delve_data::SaveFile::VERSION.to_string(),
        timestamp: "2025-06-01T12:00:00Z".to_string(),
        game_state: state,
    };
    let json = serde_json::to_string_pretty(&save).expect("serialises");
    let back: delve_data::SaveFile = serde_json::from_str(&json).expect("parses");
    assert_eq!(back.version, "1.0");
    assert_eq!(back.game_state.user.unique_name, "hero");
}
