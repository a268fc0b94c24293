//! Secret reference resolver for source credentials.
//!
//! A stored `auth_token` may point at a secret instead of holding it:
//!
//! - `pass::path/in/store`: runs `pass show path/in/store`, first line
//! - `env::VAR_NAME`: reads `$VAR_NAME` from the environment
//! - anything else: used as-is
//!
//! References are resolved right before a sync pass; the store keeps the
//! reference text.

use calmerge_core::CalendarSource;
use calmerge_providers::FailureKind;
use calmerge_sync::SourceFailure;
use tokio::process::Command;
use tracing::debug;

/// Resolves a value that may contain a secret reference prefix.
pub async fn resolve(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix("pass::") {
        resolve_pass(path).await
    } else if let Some(var) = value.strip_prefix("env::") {
        resolve_env(var)
    } else {
        Ok(value.to_string())
    }
}

/// True if `value` is a reference rather than a literal.
pub fn is_reference(value: &str) -> bool {
    value.starts_with("pass::") || value.starts_with("env::")
}

/// Replaces token references with their values.
///
/// Sources whose reference cannot be resolved are removed from the list and
/// reported as auth failures instead.
pub async fn resolve_tokens(sources: Vec<CalendarSource>) -> (Vec<CalendarSource>, Vec<SourceFailure>) {
    let mut ready = Vec::with_capacity(sources.len());
    let mut failures = Vec::new();

    for mut source in sources {
        let Some(raw) = source.auth_token.as_deref() else {
            ready.push(source);
            continue;
        };
        if !source.is_enabled || !is_reference(raw) {
            ready.push(source);
            continue;
        }

        match resolve(raw).await {
            Ok(token) => {
                debug!(source = %source.id, "resolved credential reference");
                source.auth_token = Some(token);
                ready.push(source);
            }
            Err(message) => failures.push(SourceFailure {
                source_id: source.id.clone(),
                source_name: source.name.clone(),
                kind: FailureKind::Auth,
                message,
            }),
        }
    }

    (ready, failures)
}

/// Runs `pass show <path>` and returns the first line of stdout.
async fn resolve_pass(path: &str) -> Result<String, String> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed (exit {}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .next()
        .map(|s| s.to_string())
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

fn resolve_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}
