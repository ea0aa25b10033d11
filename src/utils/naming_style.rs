use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::chat_gpt::NameSuggestion;

static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_$][a-zA-Z0-9_$]*$").unwrap());

/// Identifier casing convention requested by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NamingStyle {
    #[default]
    CamelCase,
    SnakeCase,
    PascalCase,
    KebabCase,
    /// Any style name we don't know. Formatting concatenates the words as-is.
    Other(String),
}

impl FromStr for NamingStyle {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "camelCase" => NamingStyle::CamelCase,
            "snake_case" => NamingStyle::SnakeCase,
            "PascalCase" => NamingStyle::PascalCase,
            "kebab-case" => NamingStyle::KebabCase,
            other => NamingStyle::Other(other.to_string()),
        })
    }
}

impl fmt::Display for NamingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStyle::CamelCase => f.write_str("camelCase"),
            NamingStyle::SnakeCase => f.write_str("snake_case"),
            NamingStyle::PascalCase => f.write_str("PascalCase"),
            NamingStyle::KebabCase => f.write_str("kebab-case"),
            NamingStyle::Other(name) => f.write_str(name),
        }
    }
}

/// Convert arbitrary text into an identifier of the given style.
///
/// Returns an empty string when the text holds no word characters; callers
/// must treat that as "unformattable".
pub fn format_name(text: &str, style: &NamingStyle) -> String {
    let words = split_words(text);
    if words.is_empty() {
        return String::new();
    }

    match style {
        NamingStyle::CamelCase => {
            let mut out = words[0].to_ascii_lowercase();
            for word in &words[1..] {
                out.push_str(&capitalize(word));
            }
            out
        }
        NamingStyle::SnakeCase => lowercase_all(&words).join("_"),
        NamingStyle::PascalCase => words.iter().map(|w| capitalize(w)).collect(),
        NamingStyle::KebabCase => lowercase_all(&words).join("-"),
        NamingStyle::Other(_) => words.concat(),
    }
}

/// Whether `name` is usable as an identifier in the common C-like grammars.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(name)
}

/// Reformat candidates when none of them is a valid identifier.
///
/// Candidates that format to nothing are dropped. If at least one candidate is
/// already valid the list is returned untouched, style is advisory.
pub fn repair_suggestions(
    suggestions: Vec<NameSuggestion>,
    style: &NamingStyle,
) -> Vec<NameSuggestion> {
    if suggestions.iter().any(|s| is_identifier(&s.name)) {
        return suggestions;
    }

    suggestions
        .into_iter()
        .filter_map(|mut suggestion| {
            suggestion.name = format_name(&suggestion.name, style);
            (!suggestion.name.is_empty()).then_some(suggestion)
        })
        .collect()
}

// Strips everything but ASCII word characters, whitespace and '-', then splits
// on runs of whitespace, '-' and '_'.
fn split_words(text: &str) -> Vec<String> {
    let stripped: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();

    stripped
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_ascii_lowercase()).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => format!(
            "{}{}",
            first.to_ascii_uppercase(),
            chars.as_str().to_ascii_lowercase()
        ),
        None => String::new(),
    }
}
