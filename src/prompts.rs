pub const IDENTIFY: &str = include_str!("../data/prompts/identify.txt");
pub const LOCATION_HINT: &str = include_str!("../data/prompts/location_hint.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
