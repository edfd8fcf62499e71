use std::io::{IsTerminal, Read};

pub const SYSTEM_PROMPT: &str = "You are jorin, a coding assistant working in a local repository. \
Use the shell, read_file, write_file and http_get tools to inspect and change things, \
then answer concisely once the task is done.";

/// Reads piped stdin; an interactive terminal yields nothing.
pub fn read_piped_stdin() -> std::io::Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text)
}

/// Joins the prompt text, trailing arguments and piped stdin into one user message.
pub fn build_prompt(prompt: Option<&str>, args: &[String], stdin: &str) -> String {
    let prompt = prompt.unwrap_or_default();
    let has_prompt = !prompt.trim().is_empty();
    if !has_prompt && args.is_empty() && !stdin.is_empty() {
        return stdin.trim_end_matches('\n').to_string();
    }

    let mut parts = Vec::new();
    if has_prompt {
        parts.push(prompt.to_string());
    }
    if !args.is_empty() {
        parts.push(format!("Arguments: {}", args.join(" ")));
    }
    if !stdin.is_empty() {
        parts.push(format!("Stdin:\n{}", stdin.trim_end_matches('\n')));
    }
    parts.join("\n\n")
}
