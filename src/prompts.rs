pub const DIALOGUE: &str = include_str!("../data/prompts/dialogue.txt");
pub const SCENE_IMAGE: &str = include_str!("../data/prompts/scene_image.txt");
pub const EXAMPLE_SCENARIO: &str = include_str!("../data/prompts/example_scenario.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Instruction for the dialogue adapter with `scenario` embedded verbatim.
pub fn dialogue_prompt(scenario: &str) -> String {
    render(DIALOGUE, &[("scenario", scenario)])
}

/// Instruction for the scene image adapter with `scenario` embedded verbatim.
pub fn scene_image_prompt(scenario: &str) -> String {
    render(SCENE_IMAGE, &[("scenario", scenario)])
}
