pub const VERIFY_MISSION: &str = include_str!("../data/prompts/verify_mission.txt");
pub const CHAT_SYSTEM: &str = include_str!("../data/prompts/chat_system.txt");
pub const MISSION_SUGGESTIONS: &str = include_str!("../data/prompts/mission_suggestions.txt");

/// Canned model turn that closes the persona preamble of a chat.
pub const CHAT_ACKNOWLEDGEMENT: &str = "Understood. I am ready to chat.";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
