//! Non-destructive values-file rewriting
//!
//! Lines for untouched variables are preserved byte-for-byte. An updated
//! variable has only its value segment replaced. Brand-new variables are
//! appended at the end, each preceded by a generated `# description`
//! comment when the schema provides one, separated from prior content by
//! exactly one blank line. The final output has at most one consecutive
//! blank line and a single trailing newline.

use regex_lite::Regex;

/// One variable to write: either an in-place value replacement or an
/// append, decided by whether the file already declares the name.
#[derive(Debug, Clone)]
pub struct PendingUpdate {
    pub name: String,
    pub value: String,
    /// Schema description, emitted as a comment above appended variables
    pub description: Option<String>,
}

/// Apply updates to values-file text, returning the rewritten content
pub fn apply_updates(original_text: &str, updates: &[PendingUpdate]) -> String {
    if updates.is_empty() {
        return original_text.to_string();
    }

    let declaration = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=").unwrap();

    let mut lines: Vec<String> = Vec::new();
    let mut applied: Vec<&str> = Vec::new();

    for line in original_text.lines() {
        let replaced = declaration.captures(line).and_then(|caps| {
            let name = caps.get(1).unwrap().as_str();
            updates
                .iter()
                .find(|u| u.name == name)
                .map(|u| {
                    applied.push(name);
                    // Replace only the value segment; keep the name and '='
                    // byte-for-byte
                    let prefix_end = caps.get(0).unwrap().end();
                    format!("{}{}", &line[..prefix_end], u.value)
                })
        });

        match replaced {
            Some(new_line) => lines.push(new_line),
            None => lines.push(line.to_string()),
        }
    }

    for update in updates {
        if applied.contains(&update.name.as_str()) {
            continue;
        }

        if !lines.is_empty() {
            lines.push(String::new());
        }
        if let Some(description) = &update.description {
            if !description.is_empty() {
                lines.push(format!("# {}", description));
            }
        }
        lines.push(format!("{}={}", update.name, update.value));
    }

    // Collapse runs of blank lines and end with a single newline
    let mut out = String::new();
    let mut previous_blank = false;
    for line in &lines {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        if blank && out.is_empty() {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        previous_blank = blank;
    }

    // No trailing blank line
    while out.ends_with("\n\n") {
        out.pop();
    }

    out
}
