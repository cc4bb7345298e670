use std::io::{self, IsTerminal, Read, Write};

pub(crate) fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    let mut input = String::new();
    print!("{prompt}");
    io::stdout().flush()?;
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub(crate) fn prompt_required(prompt: &str, missing: &str) -> anyhow::Result<String> {
    let value = prompt_line(prompt)?;
    if value.is_empty() {
        anyhow::bail!("{missing}");
    }
    Ok(value)
}

/// Empty input selects `default`.
pub(crate) fn prompt_with_default(prompt: &str, default: Option<&str>) -> anyhow::Result<String> {
    let value = match default {
        Some(default) => prompt_line(&format!("{prompt} [{default}]: "))?,
        None => prompt_line(&format!("{prompt}: "))?,
    };
    if value.is_empty() {
        return default
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("a value is required"));
    }
    Ok(value)
}

pub(crate) fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let password = rpassword::read_password()?;
    if password.trim().is_empty() {
        anyhow::bail!("bearer token is required");
    }
    Ok(password.trim().to_string())
}

pub(crate) fn read_stdin() -> anyhow::Result<String> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input.trim().to_string())
}

/// Flag value, then piped stdin, then an interactive prompt.
pub(crate) fn resolve_input(
    value: Option<String>,
    prompt: &str,
    missing: &str,
) -> anyhow::Result<String> {
    if let Some(value) = non_empty(value) {
        return Ok(value);
    }
    let value = if is_interactive() {
        prompt_line(prompt)?
    } else {
        tracing::debug!("reading input from stdin");
        read_stdin()?
    };
    if value.is_empty() {
        anyhow::bail!("{missing}");
    }
    Ok(value)
}
