/// Escape text for a MarkdownV2 message body.
pub fn escape_markdown_v2_reserved_chars(input: &str) -> String {
    let mut output = String::new();
    for c in input.chars() {
        match c {
            '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|'
            | '{' | '}' | '.' | '!' | '\\' => {
                output.push('\\');
                output.push(c);
            }
            _ => output.push(c),
        }
    }
    output
}

/// Escape text placed inside a MarkdownV2 `code` or ```pre``` entity.
pub fn escape_markdown_v2_code(input: &str) -> String {
    let mut output = String::new();
    for c in input.chars() {
        if c == '`' || c == '\\' {
            output.push('\\');
        }
        output.push(c);
    }
    output
}
