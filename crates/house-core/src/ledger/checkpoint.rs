//! Ledger Checkpoint
//!
//! Flat JSONL snapshot of the ledger: a week header followed by one line per
//! interaction in append order.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use house_events::{Interaction, Week};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Ledger;
use crate::config::LedgerConfig;

/// One line of a checkpoint file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum LogRecord {
    Week { week: Week },
    Interaction(Interaction),
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("checkpoint does not start with a week record")]
    MissingWeek,
}

impl Ledger {
    /// Writes the ledger to `path`, replacing any existing file
    pub fn save_checkpoint(&self, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        self.write_checkpoint(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_checkpoint<W: Write>(&self, writer: &mut W) -> Result<(), CheckpointError> {
        let header = LogRecord::Week {
            week: self.current_week,
        };
        write_record(writer, &header, 1)?;

        for (index, interaction) in self.interactions.iter().enumerate() {
            let record = LogRecord::Interaction(interaction.clone());
            write_record(writer, &record, index + 2)?;
        }
        Ok(())
    }

    /// Loads a ledger written by [`Ledger::save_checkpoint`]
    pub fn load_checkpoint(
        path: impl AsRef<Path>,
        config: LedgerConfig,
    ) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        Self::read_checkpoint(BufReader::new(file), config)
    }

    pub fn read_checkpoint<R: BufRead>(
        reader: R,
        config: LedgerConfig,
    ) -> Result<Self, CheckpointError> {
        let mut week = None;
        let mut interactions = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: LogRecord =
                serde_json::from_str(&line).map_err(|source| CheckpointError::Json {
                    line: index + 1,
                    source,
                })?;

            match (record, week) {
                (LogRecord::Week { week: w }, None) => week = Some(w),
                (LogRecord::Week { week: w }, Some(_)) => {
                    tracing::warn!("Checkpoint line {}: extra week record {} ignored", index + 1, w);
                }
                (LogRecord::Interaction(_), None) => return Err(CheckpointError::MissingWeek),
                (LogRecord::Interaction(interaction), Some(_)) => interactions.push(interaction),
            }
        }

        let week = week.ok_or(CheckpointError::MissingWeek)?;
        tracing::info!(
            "Loaded ledger checkpoint: week {}, {} interactions",
            week,
            interactions.len()
        );
        Ok(Ledger::from_parts(config, week, interactions))
    }
}

fn write_record<W: Write>(
    writer: &mut W,
    record: &LogRecord,
    line: usize,
) -> Result<(), CheckpointError> {
    let json = serde_json::to_string(record).map_err(|source| CheckpointError::Json { line, source })?;
    writeln!(writer, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use house_events::InteractionKind;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.record_interaction("bo", "ava", InteractionKind::Conversation, "chat", None);
        ledger.set_week(2);
        ledger.record_interaction("bo", "ava", InteractionKind::PromiseBroken, "lied", None);
        ledger.record_interaction("ava", "cy", InteractionKind::Defended, "stood up", None);
        ledger.set_week(5);
        ledger
    }

    #[test]
    fn test_header_line_comes_first() {
        let mut buffer = Vec::new();
        sample_ledger().write_checkpoint(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), r#"{"record":"week","week":5}"#);
        let first: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(first["record"], "interaction");
        assert_eq!(first["id"], "int_00000001");
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_replay_reproduces_trust() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.jsonl");
        let original = sample_ledger();
        original.save_checkpoint(&path).unwrap();

        let mut restored = Ledger::load_checkpoint(&path, LedgerConfig::default()).unwrap();
        assert_eq!(restored.current_week(), 5);
        assert_eq!(restored.interactions(), original.interactions());
        assert_eq!(restored.trust_score("ava", "bo"), original.trust_score("ava", "bo"));

        // numbering continues after the restored entries
        let next = restored.record_interaction("cy", "ava", InteractionKind::Argument, "spat", None);
        assert_eq!(next.id, "int_00000004");
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let mut buffer = Vec::new();
        sample_ledger().write_checkpoint(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let without_header: String = text.lines().skip(1).collect::<Vec<_>>().join("\n");

        let err = Ledger::read_checkpoint(Cursor::new(without_header), LedgerConfig::default())
            .unwrap_err();
        assert!(matches!(err, CheckpointError::MissingWeek));
    }

    #[test]
    fn test_garbage_line_reports_line_number() {
        let input = "{\"record\":\"week\",\"week\":1}\nnot json\n";
        let err = Ledger::read_checkpoint(Cursor::new(input), LedgerConfig::default()).unwrap_err();
        assert!(matches!(err, CheckpointError::Json { line: 2, .. }));
    }
}
