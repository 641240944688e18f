//! Backup documents: the JSON the backend produces in `backup/generate` and
//! accepts back in `backup/restore`.
//!
//! Current documents look like `{"metadata": {...}, "data": {"users": [...], ...}}`.
//! Older ones carry the collections at the top level, without `data`.

use std::fs;
use std::path::Path;
use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};
use crate::api::models::{GeneratedBackup, RestoreOutcome};
use crate::error::BackupError;

const COLLECTIONS: [(&str, &str); 5] = [
    ("users", "Usuários"),
    ("turmas", "Turmas"),
    ("students", "Alunos"),
    ("attendance", "Chamadas"),
    ("revistas", "Revistas"),
];

/// Portuguese label of a collection; unknown keys are shown as they are.
pub fn collection_label(key: &str) -> &str {
    COLLECTIONS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |&(_, label)| label)
}

/// A backup read from disk, waiting for the user to confirm the restore.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupFile {
    pub document: Value,
    /// `metadata.backup_date`, formatted for display when it parses.
    pub backup_date: Option<String>,
    pub total_records: Option<i64>,
    /// Records per collection.
    pub counts: Vec<(String, usize)>,
}

pub fn parse_backup(text: &str) -> Result<BackupFile, BackupError> {
    let document: Value = serde_json::from_str(text).map_err(|_| BackupError::InvalidJson)?;
    let Some(root) = document.as_object() else {
        return Err(BackupError::UnknownFormat);
    };
    let present = |key: &str| root.get(key).filter(|v| !v.is_null());
    if present("data").is_none() && present("metadata").is_none() {
        return Err(BackupError::UnknownFormat);
    }

    let metadata = present("metadata").and_then(Value::as_object);
    let backup_date = metadata
        .and_then(|m| m.get("backup_date"))
        .and_then(Value::as_str)
        .map(display_timestamp);
    let total_records = metadata
        .and_then(|m| m.get("total_records"))
        .and_then(Value::as_i64)
        .filter(|&n| n > 0);

    let counts = match present("data").and_then(Value::as_object) {
        Some(data) => collection_counts(data, None),
        None => collection_counts(root, Some("metadata")),
    };

    Ok(BackupFile {
        backup_date,
        total_records,
        counts,
        document,
    })
}

fn collection_counts(data: &Map<String, Value>, skip: Option<&str>) -> Vec<(String, usize)> {
    data.iter()
        .filter(|(key, _)| Some(key.as_str()) != skip)
        .map(|(key, value)| (key.clone(), value.as_array().map_or(0, Vec::len)))
        .collect()
}

fn display_timestamp(raw: &str) -> String {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return at.format("%d/%m/%Y %H:%M").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(at) => at.format("%d/%m/%Y %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn read_backup(path: &Path) -> Result<BackupFile, BackupError> {
    let text = fs::read_to_string(path)?;
    let file = parse_backup(&text)?;
    tracing::info!(path = %path.display(), collections = file.counts.len(), "backup file read");
    Ok(file)
}

pub fn write_backup(path: &Path, document: &Value) -> Result<(), BackupError> {
    let text = serde_json::to_string_pretty(document).map_err(|e| BackupError::Io(e.to_string()))?;
    fs::write(path, text)?;
    tracing::info!(path = %path.display(), "backup written");
    Ok(())
}

/// Name suggested in the save dialog when the backend did not send one.
pub fn default_filename(now: NaiveDateTime) -> String {
    now.format("ebd_backup_%Y%m%d_%H%M%S.json").to_string()
}

pub fn generated_message(generated: &GeneratedBackup, path: &Path) -> String {
    let summary = &generated.summary;
    let mut message = format!("Backup gerado com sucesso! Arquivo: {}", path.display());
    if let Some(size) = generated.size_mb {
        message.push_str(&format!(" ({} MB)", format!("{size:.2}").replace('.', ",")));
    }
    message.push_str(&format!(
        ". Usuários: {}, Turmas: {}, Alunos: {}, Chamadas: {}, Revistas: {}",
        summary.users, summary.turmas, summary.students, summary.attendance, summary.revistas
    ));
    message
}

pub fn restored_message(outcome: &RestoreOutcome) -> String {
    let parts: Vec<String> = outcome
        .restore_summary
        .iter()
        .map(|(key, count)| format!("{}: {count}", collection_label(key)))
        .collect();
    format!(
        "Backup restaurado com sucesso! {}. Total: {} registros",
        parts.join(", "),
        outcome.total_restored
    )
}
