//! Script parser for pipexpect dialogue files.
//!
//! The top-level entry points are [`parse_str`] and [`parse_file`].
//!
//! | Line | Step |
//! |------|------|
//! | `expect "text"` | read one line, require it to equal `text` |
//! | `send "text"` | write `text` followed by a newline |
//! | `write "text"` | write `text` as-is |
//! | `# comment` | ignored, also allowed after a command |

use crate::driver::{Script, Step};
use anyhow::{Context as _, Result, anyhow};
use std::path::Path;

/// Parse a dialogue script from a string slice.
///
/// Lines that are empty or start with `#` are ignored. Inline comments (` # …`)
/// are stripped while preserving `#` characters inside quoted strings.
///
/// # Errors
///
/// Returns an error if any line contains an unknown command or a malformed
/// quoted string.
///
/// # Example
///
/// ```
/// use pipexpect::parse_str;
///
/// let script = parse_str("expect \"Enter your name:\"\nsend \"Adrian\"\n").unwrap();
/// assert_eq!(script.len(), 2);
/// ```
pub fn parse_str(content: &str) -> Result<Script> {
    let mut script = Script::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = strip_inline_comment(line);
        let step = parse_line(line)
            .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
        script.push(step);
    }
    Ok(script)
}

/// Parse a dialogue script from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if the script is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Script> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))?;
    parse_str(&content)
}

type ParseFn = fn(&str) -> Result<Step>;

static REGISTRY: &[(&str, ParseFn)] = &[
    ("expect", parse_expect),
    ("send", parse_send),
    ("write", parse_write),
];

fn parse_expect(args: &str) -> Result<Step> {
    Ok(Step::expect(parse_quoted_string(args)?))
}

/// `send` appends the newline most line-reading programs wait for.
fn parse_send(args: &str) -> Result<Step> {
    Ok(Step::send_line(parse_quoted_string(args)?))
}

fn parse_write(args: &str) -> Result<Step> {
    Ok(Step::send(parse_quoted_string(args)?))
}

fn parse_line(line: &str) -> Result<Step> {
    let (name, args) = line.split_once(' ').unwrap_or((line, ""));
    REGISTRY
        .iter()
        .find(|(cmd_name, _)| *cmd_name == name)
        .map(|(_, parse)| parse(args))
        .unwrap_or_else(|| Err(anyhow!("Unknown command: {}", line)))
}

/// Strip inline comments from a line, preserving `#` inside quoted strings.
fn strip_inline_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch == '#' && !in_quotes {
            return line[..i].trim();
        }
    }
    line
}

/// Parse a double-quoted string, processing `\n`, `\t`, `\r`, `\"`, and `\\`.
fn parse_quoted_string(s: &str) -> Result<String> {
    let s = s.trim();
    let inner = s
        .strip_prefix('"')
        .ok_or_else(|| anyhow!("Expected string to start with '\"'"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                let rest = chars.as_str().trim();
                if !rest.is_empty() {
                    return Err(anyhow!("Unexpected text after closing quote: {}", rest));
                }
                return Ok(out);
            }
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => return Err(anyhow!("Unknown escape sequence: \\{}", other)),
                None => break,
            },
            _ => out.push(ch),
        }
    }
    Err(anyhow!("Expected string to end with '\"'"))
}
