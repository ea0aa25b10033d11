use std::ops::Range;

use thiserror::Error;

/// The text to name plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTarget {
    pub selected_text: String,
    pub context: String,
    /// The replied-to document and the byte range of the selection in it.
    pub document: Option<(String, Range<usize>)>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Please give the text to name, e.g. /variable number of retries")]
    Empty,
    #[error("\"{0}\" does not appear in the message you replied to")]
    NotFound(String),
}

impl NamingTarget {
    /// Build the target from the command argument and, when the command is a
    /// reply, the replied message's text.
    ///
    /// With a reply the argument is the selection inside that document and the
    /// context is `context_lines` lines around it. Without one, the first line
    /// of the argument is the selection and the remaining lines are context.
    pub fn from_input(
        argument: &str,
        replied_text: Option<&str>,
        context_lines: usize,
    ) -> Result<Self, SelectionError> {
        match replied_text {
            Some(document) => {
                let selected_text = argument.trim();
                if selected_text.is_empty() {
                    return Err(SelectionError::Empty);
                }
                let range = locate_selection(document, selected_text)
                    .ok_or_else(|| SelectionError::NotFound(selected_text.to_string()))?;
                Ok(NamingTarget {
                    selected_text: selected_text.to_string(),
                    context: context_window(document, &range, context_lines),
                    document: Some((document.to_string(), range)),
                })
            }
            None => {
                let (first_line, rest) = argument.split_once('\n').unwrap_or((argument, ""));
                let selected_text = first_line.trim();
                if selected_text.is_empty() {
                    return Err(SelectionError::Empty);
                }
                Ok(NamingTarget {
                    selected_text: selected_text.to_string(),
                    context: rest.trim_matches('\n').to_string(),
                    document: None,
                })
            }
        }
    }
}

pub fn locate_selection(document: &str, selected_text: &str) -> Option<Range<usize>> {
    document
        .find(selected_text)
        .map(|start| start..start + selected_text.len())
}

/// Lines of `document` from `lines` before the selection's first line to
/// `lines` after its last line, clamped to the document.
pub fn context_window(document: &str, range: &Range<usize>, lines: usize) -> String {
    let all_lines: Vec<&str> = document.lines().collect();
    if all_lines.is_empty() {
        return String::new();
    }

    let first_line = document[..range.start].matches('\n').count();
    let last_line = first_line + document[range.clone()].matches('\n').count();

    let end = (last_line + lines).min(all_lines.len() - 1);
    let start = first_line.saturating_sub(lines).min(end);
    all_lines[start..=end].join("\n")
}

pub fn replace_selection(document: &str, range: &Range<usize>, name: &str) -> String {
    let mut replaced = String::with_capacity(document.len() + name.len());
    replaced.push_str(&document[..range.start]);
    replaced.push_str(name);
    replaced.push_str(&document[range.end..]);
    replaced
}

/// Guess the language of a snippet from a few telltale keywords.
pub fn detect_language(text: &str) -> &'static str {
    if text.contains("function") && (text.contains('{') || text.contains("=>")) {
        return "javascript";
    }
    if text.contains("def ") && text.contains(':') {
        return "python";
    }
    if text.contains("public class") || text.contains("private void") {
        return "java";
    }
    if text.contains("func ") && text.contains("()") {
        return "go";
    }
    "javascript"
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "line0\nline1\nline2\nlet total = a + b;\nline4\nline5\nline6";

    #[test]
    fn window_is_clamped_to_document() {
        let range = locate_selection(DOCUMENT, "a + b").unwrap();
        assert_eq!(context_window(DOCUMENT, &range, 1), "line2\nlet total = a + b;\nline4");
        assert_eq!(context_window(DOCUMENT, &range, 5), DOCUMENT);
        assert_eq!(context_window(DOCUMENT, &range, 0), "let total = a + b;");
    }

    #[test]
    fn window_covers_multi_line_selection() {
        let range = locate_selection(DOCUMENT, "line1\nline2").unwrap();
        assert_eq!(context_window(DOCUMENT, &range, 1), "line0\nline1\nline2\nlet total = a + b;");
    }

    #[test]
    fn replacing_selection_keeps_the_rest() {
        let range = locate_selection(DOCUMENT, "a + b").unwrap();
        let replaced = replace_selection(DOCUMENT, &range, "sumOfParts");
        assert!(replaced.contains("let total = sumOfParts;"));
        assert!(replaced.starts_with("line0\n"));
        assert!(replaced.ends_with("\nline6"));
    }

    #[test]
    fn reply_target_uses_document_window() {
        let target = NamingTarget::from_input("  a + b ", Some(DOCUMENT), 1).unwrap();
        assert_eq!(target.selected_text, "a + b");
        assert_eq!(target.context, "line2\nlet total = a + b;\nline4");
        let (document, range) = target.document.unwrap();
        assert_eq!(&document[range], "a + b");
    }

    #[test]
    fn reply_target_requires_selection_in_document() {
        assert_eq!(
            NamingTarget::from_input("missing", Some(DOCUMENT), 5),
            Err(SelectionError::NotFound("missing".to_string()))
        );
        assert_eq!(
            NamingTarget::from_input("   ", Some(DOCUMENT), 5),
            Err(SelectionError::Empty)
        );
    }

    #[test]
    fn plain_target_splits_selection_from_context() {
        let target =
            NamingTarget::from_input("retry count\nfor i in 0..3 {\n  send();\n}\n", None, 5)
                .unwrap();
        assert_eq!(target.selected_text, "retry count");
        assert_eq!(target.context, "for i in 0..3 {\n  send();\n}");
        assert_eq!(target.document, None);

        let target = NamingTarget::from_input("retry count", None, 5).unwrap();
        assert_eq!(target.context, "");
        assert_eq!(NamingTarget::from_input("\ncode", None, 5), Err(SelectionError::Empty));
    }

    #[test]
    fn detects_language_from_keywords() {
        assert_eq!(detect_language("function f() { return 1; }"), "javascript");
        assert_eq!(detect_language("def f(x):\n    return x"), "python");
        assert_eq!(detect_language("public class Foo {}"), "java");
        assert_eq!(detect_language("func main() {}"), "go");
        assert_eq!(detect_language("SELECT 1"), "javascript");
    }
}
