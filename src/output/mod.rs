use anyhow::{Context, Result};
use std::path::Path;

/// Titled block as the batch front-end prints it
pub fn format_section(title: &str, body: &str) -> String {
    format!("\n{}:\n{}", title, body)
}

/// Render text as a fenced, indented block so it is never mistaken for UI chrome
pub fn code_block(text: &str, width: usize) -> String {
    let rule = "─".repeat(width.max(8));
    let mut block = String::with_capacity(text.len() + 2 * rule.len() + 16);

    block.push_str(&rule);
    block.push('\n');
    for line in text.lines() {
        block.push_str("  ");
        block.push_str(line);
        block.push('\n');
    }
    block.push_str(&rule);

    block
}

/// Save a transcript or summary to file
pub fn save_to_file(path: &Path, content: &str) -> Result<()> {
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }

    fs_err::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
