//! Source management commands.

use calmerge_core::{CalendarSource, SourceKind};
use calmerge_sync::{JsonFileStore, SourceStore, set_enabled};
use serde::Serialize;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Options for `sources add`.
#[derive(Debug, Clone)]
pub struct NewSource {
    pub id: String,
    pub kind: SourceKind,
    pub name: String,
    pub color: String,
    pub token: Option<String>,
    pub calendar_id: Option<String>,
    pub disabled: bool,
}

/// A listing row. Credentials are never printed.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SourceRow {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub name: String,
    pub color: String,
    pub enabled: bool,
    pub token: &'static str,
    pub calendar_id: Option<String>,
}

impl From<&CalendarSource> for SourceRow {
    fn from(source: &CalendarSource) -> Self {
        let token = match source.token() {
            None => "none",
            Some(t) if secret::is_reference(t) => "reference",
            Some(_) => "set",
        };
        Self {
            id: source.id.clone(),
            kind: source.kind,
            name: source.name.clone(),
            color: source.color.clone(),
            enabled: source.is_enabled,
            token,
            calendar_id: source.locator().map(str::to_string),
        }
    }
}

pub async fn list(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let store = JsonFileStore::new(config.store_path());
    let rows = rows(&store, &config.owner_id).await?;

    if json {
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| ClientError::Config(format!("failed to serialize sources: {}", e)))?;
        println!("{}", out);
    } else if rows.is_empty() {
        println!("No sources configured for {}", config.owner_id);
    } else {
        println!(
            "{:<16} {:<8} {:<20} {:<8} {:<9} {:<9} CALENDAR",
            "ID", "TYPE", "NAME", "COLOR", "ENABLED", "TOKEN"
        );
        for row in &rows {
            println!(
                "{:<16} {:<8} {:<20} {:<8} {:<9} {:<9} {}",
                row.id,
                row.kind,
                row.name,
                row.color,
                if row.enabled { "yes" } else { "no" },
                row.token,
                row.calendar_id.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

pub async fn rows(store: &dyn SourceStore, owner_id: &str) -> ClientResult<Vec<SourceRow>> {
    Ok(store
        .load_all(owner_id)
        .await?
        .iter()
        .map(SourceRow::from)
        .collect())
}

pub async fn add(config: &ClientConfig, new: NewSource) -> ClientResult<()> {
    let store = JsonFileStore::new(config.store_path());
    let (source, warnings) = add_to(&store, &config.owner_id, new).await?;

    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    println!("Saved source {} ({})", source.id, source.kind);
    Ok(())
}

/// Builds and stores the source. Returns notes about fields a sync will
/// need but that were left out.
pub async fn add_to(
    store: &dyn SourceStore,
    owner_id: &str,
    new: NewSource,
) -> ClientResult<(CalendarSource, Vec<String>)> {
    if new.id.trim().is_empty() {
        return Err(ClientError::Usage("source id must not be empty".into()));
    }

    let mut source = CalendarSource::new(new.id, new.kind, new.name, new.color)
        .with_owner(owner_id)
        .with_enabled(!new.disabled);
    if let Some(token) = new.token {
        source = source.with_token(token);
    }
    if let Some(calendar_id) = new.calendar_id {
        source = source.with_calendar_id(calendar_id);
    }

    let mut warnings = Vec::new();
    if source.kind.requires_token() && source.token().is_none() {
        warnings.push(format!(
            "{} sources need a token; {} will be skipped until one is set",
            source.kind, source.id
        ));
    }
    if source.kind.requires_calendar_id() && source.locator().is_none() {
        warnings.push(format!(
            "{} sources need --calendar-id; {} will be skipped until one is set",
            source.kind, source.id
        ));
    }

    store.upsert(&source).await?;
    info!(source = %source.id, kind = %source.kind, "source saved");
    Ok((source, warnings))
}

pub async fn toggle(config: &ClientConfig, id: &str, enabled: bool) -> ClientResult<()> {
    let store = JsonFileStore::new(config.store_path());
    let source = set_enabled(&store, &config.owner_id, id, enabled).await?;
    println!(
        "{} {}",
        if source.is_enabled { "Enabled" } else { "Disabled" },
        source.id
    );
    Ok(())
}
