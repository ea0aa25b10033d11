use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::NameSuggestion;

const QUOTED_NAME_EXPLANATION: &str = "Suggested name";

// Greedy: first '[' through the last ']', across lines.
static JSON_ARRAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

// `1. userId - why`, `2. "userName": why`, `3. `total_count` – why`
static NUMBERED_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[0-9]+\.\s+[`'"]*([a-zA-Z0-9_]+)[`'"]*\s*[-–:]\s*(.*)$"#).unwrap()
});

static NUMBER_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[0-9]+\.").unwrap());

static QUOTED_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"`]([a-zA-Z][a-zA-Z0-9_]+)['"`]"#).unwrap());

/// Recover name suggestions from free-form model output.
///
/// Tries, in order, an embedded JSON array, a numbered list and finally any
/// quoted identifiers; the first tier that yields candidates wins. Returns an
/// empty list when nothing looks like a name.
pub fn parse_suggestions(raw: &str) -> Vec<NameSuggestion> {
    let tiers: [fn(&str) -> Vec<NameSuggestion>; 3] =
        [json_array_suggestions, numbered_list_suggestions, quoted_name_suggestions];

    tiers
        .iter()
        .map(|tier| tier(raw))
        .find(|suggestions| !suggestions.is_empty())
        .unwrap_or_default()
}

fn json_array_suggestions(raw: &str) -> Vec<NameSuggestion> {
    let Some(found) = JSON_ARRAY_PATTERN.find(raw) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<Value>>(found.as_str()) {
        Ok(entries) => entries.iter().filter_map(suggestion_from_value).collect(),
        Err(_) => Vec::new(),
    }
}

// Entries without a non-empty string `name` are dropped; optional fields are
// kept only when they are non-blank strings.
fn suggestion_from_value(value: &Value) -> Option<NameSuggestion> {
    let object = value.as_object()?;
    let name = object.get("name")?.as_str()?;
    if name.is_empty() {
        return None;
    }

    let text_field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
    };
    Some(NameSuggestion {
        name: name.to_string(),
        explanation: text_field("explanation"),
        reason: text_field("reason"),
    })
}

fn numbered_list_suggestions(raw: &str) -> Vec<NameSuggestion> {
    let mut suggestions = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in raw.lines() {
        if let Some(caps) = NUMBERED_ITEM_PATTERN.captures(line) {
            flush_item(&mut current, &mut suggestions);
            current = Some((caps[1].to_string(), caps[2].trim().to_string()));
        } else if line.trim().is_empty() || NUMBER_PREFIX_PATTERN.is_match(line) {
            flush_item(&mut current, &mut suggestions);
        } else if let Some((_, explanation)) = current.as_mut() {
            if !explanation.is_empty() {
                explanation.push(' ');
            }
            explanation.push_str(line.trim());
        }
    }
    flush_item(&mut current, &mut suggestions);

    suggestions
}

fn flush_item(current: &mut Option<(String, String)>, suggestions: &mut Vec<NameSuggestion>) {
    if let Some((name, explanation)) = current.take() {
        if !explanation.is_empty() {
            suggestions.push(NameSuggestion {
                name,
                explanation: Some(explanation),
                reason: None,
            });
        }
    }
}

fn quoted_name_suggestions(raw: &str) -> Vec<NameSuggestion> {
    let mut seen = HashSet::new();

    QUOTED_NAME_PATTERN
        .captures_iter(raw)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .map(|name| NameSuggestion {
            name,
            explanation: Some(QUOTED_NAME_EXPLANATION.to_string()),
            reason: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(suggestions: &[NameSuggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_pure_json_array() {
        let input = r#"[{"name": "userAccountId", "explanation": "Identifies the account"},
{"name": "accountKey", "explanation": "Lookup key", "reason": "short"}]"#;
        let result = parse_suggestions(input);
        assert_eq!(
            result,
            vec![
                NameSuggestion {
                    name: "userAccountId".to_string(),
                    explanation: Some("Identifies the account".to_string()),
                    reason: None,
                },
                NameSuggestion {
                    name: "accountKey".to_string(),
                    explanation: Some("Lookup key".to_string()),
                    reason: Some("short".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_json_wins_over_numbered_list() {
        let input = r#"Here you go:
1. wrongName - should be ignored
```json
[{"name": "retryCount", "explanation": "How many retries"}]
```
2. otherWrong - also ignored"#;
        let result = parse_suggestions(input);
        assert_eq!(names(&result), vec!["retryCount"]);
        assert_eq!(result[0].explanation.as_deref(), Some("How many retries"));
    }

    #[test]
    fn test_json_entries_without_string_name_are_dropped() {
        let input = r#"[{"name": 42}, {"explanation": "no name"}, "bare",
{"name": "kept", "explanation": 7}]"#;
        let result = parse_suggestions(input);
        assert_eq!(names(&result), vec!["kept"]);
        assert_eq!(result[0].explanation, None);
    }

    #[test]
    fn test_json_blank_optional_fields_are_none() {
        let input = r#"[{"name": "retryCount", "explanation": "", "reason": "  "}]"#;
        let result = parse_suggestions(input);
        assert_eq!(
            result,
            vec![NameSuggestion {
                name: "retryCount".to_string(),
                explanation: None,
                reason: None,
            }]
        );
    }

    #[test]
    fn test_numbered_list_fallback() {
        let input = "1. fooBar - explanation\n2. bazQux - other";
        let result = parse_suggestions(input);
        assert_eq!(names(&result), vec!["fooBar", "bazQux"]);
        assert_eq!(result[0].explanation.as_deref(), Some("explanation"));
        assert_eq!(result[1].explanation.as_deref(), Some("other"));
    }

    #[test]
    fn test_numbered_list_with_quotes_colons_and_continuations() {
        let input = "Suggestions:\n\n\
                     1. `totalPrice`: Sum of all items\n   including tax\n\
                     2. \"grandTotal\" – Final amount\n\n\
                     Hope this helps!";
        let result = parse_suggestions(input);
        assert_eq!(names(&result), vec!["totalPrice", "grandTotal"]);
        assert_eq!(
            result[0].explanation.as_deref(),
            Some("Sum of all items including tax")
        );
        assert_eq!(result[1].explanation.as_deref(), Some("Final amount"));
    }

    #[test]
    fn test_quoted_names_fallback_dedupes_in_order() {
        let input = r#"Maybe "alphaBeta" or 'gammaDelta', though "alphaBeta" is best."#;
        let result = parse_suggestions(input);
        assert_eq!(names(&result), vec!["alphaBeta", "gammaDelta"]);
        assert!(result
            .iter()
            .all(|s| s.explanation.as_deref() == Some(QUOTED_NAME_EXPLANATION)));
    }

    #[test]
    fn test_quoted_names_ignore_single_letters() {
        let result = parse_suggestions(r#"use "x" or `idx`"#);
        assert_eq!(names(&result), vec!["idx"]);
    }

    #[test]
    fn test_malformed_json_falls_through() {
        let input = "[ {name: fooBar} ]\n1. fooBar - unquoted key recovered";
        let result = parse_suggestions(input);
        assert_eq!(names(&result), vec!["fooBar"]);

        let input = "[ {name: 'fooBar'} ]";
        let result = parse_suggestions(input);
        assert_eq!(names(&result), vec!["fooBar"]);
    }

    #[test]
    fn test_nothing_recognisable_yields_empty() {
        assert!(parse_suggestions("").is_empty());
        assert!(parse_suggestions("I cannot help with that.").is_empty());
        assert!(parse_suggestions("[]").is_empty());
    }
}
