pub const SYSTEM_PROMPT_TEMPLATE: &str = "You are relaying a group chat. Translate the following chat message to {target_language}. \
     Output only the translated message without any explanations or quotes. \
     Keep names, @mentions, URLs and emoji unchanged.";

#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_system_prompt(target_language: &str) -> String {
    // {target_language} is a placeholder for string replacement, not a format argument
    SYSTEM_PROMPT_TEMPLATE.replace("{target_language}", target_language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_system_prompt() {
        let prompt = build_system_prompt("Russian");
        assert!(prompt.contains("to Russian."));
        assert!(prompt.contains("Translate the following chat message"));
        assert!(!prompt.contains("{target_language}"));
    }

    #[test]
    fn test_system_prompt_template_has_placeholder() {
        assert!(SYSTEM_PROMPT_TEMPLATE.contains("{target_language}"));
    }
}
