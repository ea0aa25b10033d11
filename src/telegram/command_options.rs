/// Per-command overrides given as leading flags, e.g. `-lrust -ssnake_case`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOptions {
    pub language: Option<String>,
    pub naming_style: Option<String>,
}

/// Split leading `-l<language>` / `-s<style>` flags from the command body.
///
/// Parsing stops at the first token that is not a flag. A flag without a
/// value (`-l` alone) is skipped.
pub fn split_options_and_body(user_input: &str) -> (CommandOptions, &str) {
    let mut options = CommandOptions::default();
    let mut rest = user_input.trim_start();

    loop {
        let token = rest.split(char::is_whitespace).next().unwrap_or_default();
        let (slot, value) = if let Some(language) = token.strip_prefix("-l") {
            (&mut options.language, language)
        } else if let Some(style) = token.strip_prefix("-s") {
            (&mut options.naming_style, style)
        } else {
            break;
        };
        if !value.is_empty() {
            *slot = Some(value.to_string());
        }
        rest = rest[token.len()..].trim_start();
    }

    (options, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_returns_body() {
        let (options, body) = split_options_and_body("user account id");
        assert_eq!(options, CommandOptions::default());
        assert_eq!(body, "user account id");
    }

    #[test]
    fn reads_language_and_style_flags() {
        let (options, body) = split_options_and_body("-lrust -ssnake_case user account id");
        assert_eq!(options.language.as_deref(), Some("rust"));
        assert_eq!(options.naming_style.as_deref(), Some("snake_case"));
        assert_eq!(body, "user account id");
    }

    #[test]
    fn empty_flag_is_skipped_and_newline_body_kept() {
        let (options, body) = split_options_and_body("-l -sPascalCase\nretry count\nloop {}");
        assert_eq!(options.language, None);
        assert_eq!(options.naming_style.as_deref(), Some("PascalCase"));
        assert_eq!(body, "retry count\nloop {}");
    }

    #[test]
    fn flags_after_body_are_part_of_body() {
        let (options, body) = split_options_and_body("max -lrust");
        assert_eq!(options, CommandOptions::default());
        assert_eq!(body, "max -lrust");
    }

    #[test]
    fn only_flags_leaves_empty_body() {
        let (options, body) = split_options_and_body("-lgo");
        assert_eq!(options.language.as_deref(), Some("go"));
        assert_eq!(body, "");
    }
}
