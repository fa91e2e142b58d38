//! Version parsing for tool `--version` output

use anyhow::Result;
use semver::Version;

/// Parse a version out of tool output such as `v20.11.1`, `Python 3.12.2`
/// or `uv 0.4.18 (abc 2024-09-30)`. Two-part versions get a zero patch.
pub fn parse_version(output: &str) -> Result<Version> {
    let token = output
        .split_whitespace()
        .map(|t| t.strip_prefix('v').unwrap_or(t))
        .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))
        .ok_or_else(|| anyhow::anyhow!("No version found in '{}'", output.trim()))?;

    // drop build metadata in parentheses or trailing punctuation
    let token = token.trim_end_matches(|c: char| !c.is_ascii_alphanumeric());

    let normalized = match token.split('.').count() {
        1 => format!("{}.0.0", token),
        2 => format!("{}.0", token),
        _ => token.to_string(),
    };

    Version::parse(&normalized).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", token, e))
}

/// Compare an installed version against a minimum.
/// Returns a message when the installed version is too old; unparseable
/// versions are not reported.
pub fn check_minimum(tool: &str, installed: &str, minimum: &Version) -> Option<String> {
    let found = parse_version(installed).ok()?;
    if found < *minimum {
        Some(format!(
            "{} {} is installed, but {} or newer is required",
            tool, found, minimum
        ))
    } else {
        None
    }
}
