use anyhow::{Context, Result, bail};
use std::env;

pub fn required_var(name: &str) -> Result<String> {
    let value =
        env::var(name).with_context(|| format!("missing required environment variable {}", name))?;
    if value.trim().is_empty() {
        bail!("missing required environment variable {}", name);
    }
    Ok(value)
}

pub fn optional_var(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

pub fn int_var(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("invalid integer for {}: {}", name, value)),
        _ => Ok(default),
    }
}
