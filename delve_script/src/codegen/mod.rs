//! Code generation: lower the validated AST to a game state and splice it
//! into the fixed HTML/CSS/runtime template.

mod state;
mod template;

use crate::Program;

/// Produce the complete, self-contained HTML document for a program.
///
/// The output is byte-identical across runs for the same input: struct
/// field order fixes the JSON key order, `variables` preserves declaration
/// order, and nothing iterates a hash map.
pub fn generate_html(program: &Program) -> String {
    let state = state::build_state(program);
    let state_json = serde_json::to_string_pretty(&state).expect("game state serialises to JSON");

    let init = program.init.as_ref();
    let endpoint = llm_literal(init.and_then(|i| i.llm_endpoint.as_deref()));
    let token = llm_literal(init.and_then(|i| i.llm_token.as_deref()));
    let runtime = template::RUNTIME
        .replace("LLM_ENDPOINT_PLACEHOLDER", &endpoint)
        .replace("LLM_TOKEN_PLACEHOLDER", &token);

    let mut html = String::with_capacity(64 * 1024 + state_json.len());
    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html lang=\"en\">\n");
    html.push_str("<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("    <title>Dungeon Game</title>\n");
    html.push_str("    <style>");
    html.push_str(template::CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n");
    html.push_str("<body>");
    html.push_str(template::BODY);
    html.push_str("<script>\n");
    html.push_str("const INITIAL_GAME_STATE = ");
    html.push_str(&state_json);
    html.push_str(";\n");
    html.push_str(&runtime);
    html.push_str("</script>\n");
    html.push_str("</body>\n");
    html.push_str("</html>\n");
    html
}

/// JSON-encode an LLM config string, or the bare word `null` when unset.
fn llm_literal(value: Option<&str>) -> String {
    match value {
        Some(v) => serde_json::to_string(v).expect("string serialises"),
        None => "null".to_string(),
    }
}
