//! Import and export of the nested `chapter_collection` document.
//!
//! Import flattens the nested document into the canonical row sequence in
//! depth-first document order, generating a fresh id for every row. Export
//! reassembles the nesting purely from depth transitions over the current
//! sequence order, so structural edits survive the round trip. Optional
//! fields that are blank are normalised to JSON `null` on export, never
//! emitted as empty strings, which keeps `absent -> default -> absent`
//! round trips stable.

use crate::config::Config;
use crate::row::{Row, RowKind};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Top-level discriminator every importable document must carry.
pub const DOCUMENT_TYPE: &str = "chapter_collection";

/// Schema version stamped on every export.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
/// Failures while reading or writing a collection document.
pub enum DocumentError {
    /// The top-level `type` discriminator did not match.
    #[error("expected document type \"chapter_collection\", found {0:?}")]
    WrongType(String),
    /// The input was not valid JSON for the schema.
    #[error("invalid document: {0}")]
    Parse(#[from] serde_json::Error),
    /// Reading or writing the file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
/// The nested document envelope.
pub struct Collection {
    /// Must equal [`DOCUMENT_TYPE`] for imports; always emitted on export.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Schema version, currently 1.
    #[serde(default = "default_version")]
    pub version: u32,
    /// ISO-8601 export timestamp; ignored on import.
    #[serde(default)]
    pub exported_at: String,
    /// Chapters in document order.
    #[serde(default)]
    pub chapters: Vec<ChapterDoc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
/// One chapter with its nested topics.
pub struct ChapterDoc {
    /// Chapter display name.
    #[serde(default)]
    pub name: String,
    /// Primary language code; defaults from configuration when absent.
    #[serde(default)]
    pub primary_language: Option<String>,
    /// Secondary language code; defaults from configuration when absent.
    #[serde(default)]
    pub secondary_language: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional metadata blob.
    #[serde(default)]
    pub metadata: Option<String>,
    /// Topics in document order.
    #[serde(default)]
    pub topics: Vec<TopicDoc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
/// One topic with its nested subtopics.
pub struct TopicDoc {
    /// Text in the chapter's primary language.
    #[serde(default)]
    pub primary_text: String,
    /// Speech variant of the primary text.
    #[serde(default)]
    pub primary_text_speech: Option<String>,
    /// Text in the chapter's secondary language.
    #[serde(default)]
    pub secondary_text: Option<String>,
    /// Speech variant of the secondary text.
    #[serde(default)]
    pub secondary_text_speech: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional metadata blob.
    #[serde(default)]
    pub metadata: Option<String>,
    /// Subtopics in document order. Always present on export, possibly
    /// empty.
    #[serde(default)]
    pub subtopics: Vec<SubtopicDoc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
/// One subtopic. Same field shape as a topic, but subtopics cannot nest.
pub struct SubtopicDoc {
    /// Text in the chapter's primary language.
    #[serde(default)]
    pub primary_text: String,
    /// Speech variant of the primary text.
    #[serde(default)]
    pub primary_text_speech: Option<String>,
    /// Text in the chapter's secondary language.
    #[serde(default)]
    pub secondary_text: Option<String>,
    /// Speech variant of the secondary text.
    #[serde(default)]
    pub secondary_text_speech: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional metadata blob.
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Flatten a parsed document into the canonical row sequence.
///
/// Every row gets a fresh id; ids in the document (there are none in the
/// schema) never survive an import. Missing language fields fall back to the
/// configured defaults, missing text fields to empty strings.
///
/// # Errors
///
/// Returns [`DocumentError::WrongType`] when the discriminator does not
/// match; no rows are produced in that case.
pub fn rows_from(doc: &Collection, config: &Config) -> Result<Vec<Row>, DocumentError> {
    if doc.doc_type != DOCUMENT_TYPE {
        return Err(DocumentError::WrongType(doc.doc_type.clone()));
    }

    let mut rows = Vec::new();
    for chapter in &doc.chapters {
        let mut row = Row::blank_chapter(
            chapter
                .primary_language
                .as_deref()
                .unwrap_or(&config.primary_language),
            chapter
                .secondary_language
                .as_deref()
                .unwrap_or(&config.secondary_language),
        );
        row.name.clone_from(&chapter.name);
        row.description = chapter.description.clone().unwrap_or_default();
        row.metadata = chapter.metadata.clone().unwrap_or_default();
        let chapter_id = row.id.clone();
        rows.push(row);

        for topic in &chapter.topics {
            let mut row = Row::blank_topic(&chapter_id);
            row.primary_text.clone_from(&topic.primary_text);
            row.primary_text_speech = topic.primary_text_speech.clone().unwrap_or_default();
            row.secondary_text = topic.secondary_text.clone().unwrap_or_default();
            row.secondary_text_speech = topic.secondary_text_speech.clone().unwrap_or_default();
            row.description = topic.description.clone().unwrap_or_default();
            row.metadata = topic.metadata.clone().unwrap_or_default();
            let topic_id = row.id.clone();
            rows.push(row);

            for subtopic in &topic.subtopics {
                let mut row = Row::blank_subtopic(&chapter_id, &topic_id);
                row.primary_text.clone_from(&subtopic.primary_text);
                row.primary_text_speech =
                    subtopic.primary_text_speech.clone().unwrap_or_default();
                row.secondary_text = subtopic.secondary_text.clone().unwrap_or_default();
                row.secondary_text_speech =
                    subtopic.secondary_text_speech.clone().unwrap_or_default();
                row.description = subtopic.description.clone().unwrap_or_default();
                row.metadata = subtopic.metadata.clone().unwrap_or_default();
                rows.push(row);
            }
        }
    }
    Ok(rows)
}

/// Parse a JSON string and flatten it into rows.
///
/// # Errors
///
/// Returns an error when the JSON does not parse or the discriminator does
/// not match.
pub fn parse(json: &str, config: &Config) -> Result<Vec<Row>, DocumentError> {
    let doc: Collection = serde_json::from_str(json)?;
    rows_from(&doc, config)
}

/// Read a document file and flatten it into rows.
///
/// # Errors
///
/// Returns an error when the file cannot be read, the JSON does not parse,
/// or the discriminator does not match.
pub fn read_file(path: &Path, config: &Config) -> Result<Vec<Row>, DocumentError> {
    let json = fs::read_to_string(path)?;
    parse(&json, config)
}

fn absent_if_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn topic_doc(row: &Row) -> TopicDoc {
    TopicDoc {
        primary_text: row.primary_text.clone(),
        primary_text_speech: absent_if_blank(&row.primary_text_speech),
        secondary_text: absent_if_blank(&row.secondary_text),
        secondary_text_speech: absent_if_blank(&row.secondary_text_speech),
        description: absent_if_blank(&row.description),
        metadata: absent_if_blank(&row.metadata),
        subtopics: Vec::new(),
    }
}

fn subtopic_doc(row: &Row) -> SubtopicDoc {
    SubtopicDoc {
        primary_text: row.primary_text.clone(),
        primary_text_speech: absent_if_blank(&row.primary_text_speech),
        secondary_text: absent_if_blank(&row.secondary_text),
        secondary_text_speech: absent_if_blank(&row.secondary_text_speech),
        description: absent_if_blank(&row.description),
        metadata: absent_if_blank(&row.metadata),
    }
}

#[must_use]
/// Reassemble the nested document from the row sequence.
///
/// The walk is driven purely by depth transitions: a depth-1 row opens a new
/// chapter, a depth-2 row attaches to the last open chapter, a depth-3 row to
/// that chapter's last topic. A depth-2 or depth-3 row with no open parent
/// indicates an upstream structural bug and is skipped rather than
/// propagated.
pub fn export(rows: &[Row]) -> Collection {
    let mut chapters: Vec<ChapterDoc> = Vec::new();
    for row in rows {
        match (row.kind, row.depth()) {
            (RowKind::Chapter, 1) => chapters.push(ChapterDoc {
                name: row.name.clone(),
                primary_language: Some(row.primary_language.clone()),
                secondary_language: absent_if_blank(&row.secondary_language),
                description: absent_if_blank(&row.description),
                metadata: absent_if_blank(&row.metadata),
                topics: Vec::new(),
            }),
            (RowKind::Topic, 2) => {
                if let Some(chapter) = chapters.last_mut() {
                    chapter.topics.push(topic_doc(row));
                }
            }
            (RowKind::Topic, 3) => {
                if let Some(topic) = chapters.last_mut().and_then(|c| c.topics.last_mut()) {
                    topic.subtopics.push(subtopic_doc(row));
                }
            }
            _ => {}
        }
    }
    Collection {
        doc_type: DOCUMENT_TYPE.to_string(),
        version: DOCUMENT_VERSION,
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        chapters,
    }
}

/// Export the row sequence to a pretty-printed JSON file.
///
/// Callers are expected to validate the sequence first; this function does
/// not gate on required fields.
///
/// # Errors
///
/// Returns an error when serialisation or the file write fails.
pub fn write_file(path: &Path, rows: &[Row]) -> Result<(), DocumentError> {
    let doc = export(rows);
    let json = serde_json::to_string_pretty(&doc)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/collection.rs"]
mod tests;
