/*
 * Produces and consumes the portable outline document: the same shape as the
 * storage snapshot, pretty-printed for people to read. Import validates the
 * document before anything is built from it and returns a complete new
 * `EditorState`; it never merges into, or persists, the current one.
 *
 * `DocumentFileOperations` abstracts reading and writing those documents on
 * disk so the presenter can be tested without touching the file system.
 */
use super::models::EditorState;
use super::persistence_codec::{self, CodecError, Snapshot};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;
use time::OffsetDateTime;
use time::macros::format_description;

pub const DOCUMENT_FILE_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        ValidationError {
            message: message.into(),
        }
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid outline document: {}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Pretty-printed export document for `state`.
pub fn export_document(state: &EditorState) -> Result<String, serde_json::Error> {
    let snapshot = persistence_codec::serialize(state);
    serde_json::to_string_pretty(&snapshot)
}

// Null, false, zero and the empty string all count as "not present".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/*
 * Validates `text` as an outline document and builds the state it describes.
 * Checks, in order: the text is JSON; the top level is an object; `nodes` is
 * an array; `openNodes` is present and truthy, then an array; the remaining
 * shape matches a snapshot; no node id repeats, and a next id can still be
 * issued. The accepted snapshot is migrated exactly like a stored one.
 */
pub fn import_document(text: &str) -> Result<EditorState, ValidationError> {
    let value: Value = persistence_codec::from_json_text(text)
        .map_err(|e| ValidationError::new(format!("the file is not valid JSON ({e})")))?;

    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::new("the document must be a JSON object"))?;

    match object.get("nodes") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(ValidationError::new("\"nodes\" must be a list")),
        None => return Err(ValidationError::new("\"nodes\" is missing")),
    }

    match object.get("openNodes") {
        Some(open) if is_truthy(open) => {
            if !open.is_array() {
                return Err(ValidationError::new("\"openNodes\" must be a list"));
            }
        }
        _ => return Err(ValidationError::new("\"openNodes\" is missing")),
    }

    let snapshot: Snapshot = persistence_codec::from_json_value(value)
        .map_err(|e| ValidationError::new(format!("unexpected document structure ({e})")))?;

    persistence_codec::deserialize(snapshot).map_err(|e| match e {
        CodecError::DuplicateId(id) => {
            ValidationError::new(format!("node id {id} is used more than once"))
        }
        CodecError::IdSpaceExhausted => {
            ValidationError::new("node ids are too large to add further nodes")
        }
        CodecError::Json(e) => ValidationError::new(e.to_string()),
    })
}

/*
 * Suggested file name for a new export, e.g.
 * `outline-export-20260417-093005.json`.
 */
pub fn default_export_file_name(now: OffsetDateTime) -> String {
    let format = format_description!("[year][month][day]-[hour][minute][second]");
    match now.format(&format) {
        Ok(stamp) => format!("outline-export-{stamp}.{DOCUMENT_FILE_EXTENSION}"),
        Err(e) => {
            log::warn!("ImportExport: Could not format export timestamp: {e}");
            format!("outline-export.{DOCUMENT_FILE_EXTENSION}")
        }
    }
}

#[derive(Debug)]
pub enum DocumentFileError {
    Io(io::Error),
    Serde(serde_json::Error),
    Validation(ValidationError),
}

impl From<io::Error> for DocumentFileError {
    fn from(err: io::Error) -> Self {
        DocumentFileError::Io(err)
    }
}

impl From<serde_json::Error> for DocumentFileError {
    fn from(err: serde_json::Error) -> Self {
        DocumentFileError::Serde(err)
    }
}

impl From<ValidationError> for DocumentFileError {
    fn from(err: ValidationError) -> Self {
        DocumentFileError::Validation(err)
    }
}

impl std::fmt::Display for DocumentFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFileError::Io(e) => write!(f, "Document I/O error: {e}"),
            DocumentFileError::Serde(e) => write!(f, "Document serialization error: {e}"),
            DocumentFileError::Validation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DocumentFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentFileError::Io(e) => Some(e),
            DocumentFileError::Serde(e) => Some(e),
            DocumentFileError::Validation(e) => Some(e),
        }
    }
}

pub trait DocumentFileOperations: Send + Sync {
    fn export_to_file(&self, state: &EditorState, path: &Path) -> Result<(), DocumentFileError>;
    fn import_from_file(&self, path: &Path) -> Result<EditorState, DocumentFileError>;
}

pub struct CoreDocumentFiles {}

impl CoreDocumentFiles {
    pub fn new() -> Self {
        CoreDocumentFiles {}
    }
}

impl Default for CoreDocumentFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentFileOperations for CoreDocumentFiles {
    fn export_to_file(&self, state: &EditorState, path: &Path) -> Result<(), DocumentFileError> {
        log::trace!("CoreDocumentFiles: Exporting outline to {path:?}");
        let document = export_document(state)?;
        fs::write(path, document)?;
        log::debug!("CoreDocumentFiles: Exported outline to {path:?}.");
        Ok(())
    }

    fn import_from_file(&self, path: &Path) -> Result<EditorState, DocumentFileError> {
        log::trace!("CoreDocumentFiles: Importing outline from {path:?}");
        let text = fs::read_to_string(path)?;
        let state = import_document(&text)?;
        log::debug!("CoreDocumentFiles: Imported outline from {path:?}.");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::OutlineNode;
    use crate::core::mutation_engine::MutationEngine;
    use tempfile::tempdir;
    use time::macros::datetime;

    fn sample_state() -> EditorState {
        let mut engine = MutationEngine::default();
        let a = engine.create_root("Alpha").unwrap();
        let b = engine.create_child(a, "Beta").unwrap();
        engine.create_root("Gamma").unwrap();
        engine.edit_content(b, "").unwrap();
        engine.toggle_content_visible(a);
        engine.select_node(b);
        engine.into_state()
    }

    #[test]
    fn test_export_then_import_reproduces_state() {
        let state = sample_state();
        let document = export_document(&state).unwrap();
        assert!(document.contains('\n'), "export should be pretty-printed");
        let imported = import_document(&document).unwrap();
        assert_eq!(imported, state);
        assert_eq!(imported.selected_node_id, Some(2));
        assert!(imported.open_nodes.contains(&1));
    }

    #[test]
    fn test_import_scenario_next_id_continues_after_document() {
        let document = r#"{"nodes":[{"id":5,"title":"X","content":"","contentVisible":true,"children":[]}],"selectedNodeId":null,"nextId":6,"openNodes":[]}"#;
        let state = import_document(document).unwrap();
        assert_eq!(
            state.nodes,
            vec![OutlineNode::new_full(5, "X", "", true, vec![])]
        );
        let mut engine = MutationEngine::new(state);
        assert_eq!(engine.create_root("Y").unwrap(), 6);
    }

    #[test]
    fn test_import_rejects_missing_or_falsy_open_nodes() {
        for document in [
            r#"{"nodes":[],"nextId":1}"#,
            r#"{"nodes":[],"nextId":1,"openNodes":null}"#,
            r#"{"nodes":[],"nextId":1,"openNodes":0}"#,
            r#"{"nodes":[],"nextId":1,"openNodes":false}"#,
            r#"{"nodes":[],"nextId":1,"openNodes":""}"#,
        ] {
            let err = import_document(document).unwrap_err();
            assert!(err.message().contains("openNodes"), "{document}: {err}");
        }
    }

    #[test]
    fn test_import_rejects_truthy_non_list_open_nodes() {
        let err = import_document(r#"{"nodes":[],"openNodes":3}"#).unwrap_err();
        assert_eq!(err.message(), "\"openNodes\" must be a list");
    }

    #[test]
    fn test_import_rejects_bad_shapes() {
        assert!(import_document("not json at all").is_err());
        assert!(import_document("[1,2,3]").is_err());
        assert!(import_document(r#"{"openNodes":[]}"#).is_err());
        assert!(import_document(r#"{"nodes":{},"openNodes":[]}"#).is_err());
        assert!(import_document(r#"{"nodes":[{"title":"no id"}],"openNodes":[]}"#).is_err());
        assert!(import_document(r#"{"nodes":[{"id":-1,"title":"neg"}],"openNodes":[]}"#).is_err());
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let document = r#"{"nodes":[{"id":1,"title":"a","children":[{"id":1,"title":"b"}]}],"nextId":2,"openNodes":[]}"#;
        let err = import_document(document).unwrap_err();
        assert!(err.message().contains("more than once"));
    }

    #[test]
    fn test_import_accepts_old_schema_nodes() {
        let document = r#"{"nodes":[{"id":1,"title":"Legacy"}],"selectedNodeId":1,"nextId":2,"openNodes":[1]}"#;
        let state = import_document(document).unwrap();
        assert_eq!(state.nodes[0].content, "Content of Legacy.");
        assert!(state.nodes[0].children.is_empty());
        assert_eq!(state.selected_node_id, Some(1));
    }

    #[test]
    fn test_default_export_file_name() {
        let name = default_export_file_name(datetime!(2026-04-17 09:30:05 UTC));
        assert_eq!(name, "outline-export-20260417-093005.json");
    }

    #[test]
    fn test_core_document_files_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("outline.json");
        let files = CoreDocumentFiles::new();
        let state = sample_state();

        files.export_to_file(&state, &path).unwrap();
        assert_eq!(files.import_from_file(&path).unwrap(), state);
    }

    #[test]
    fn test_core_document_files_errors() {
        let dir = tempdir().unwrap();
        let files = CoreDocumentFiles::new();
        assert!(matches!(
            files.import_from_file(&dir.path().join("missing.json")),
            Err(DocumentFileError::Io(_))
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{"nodes":[]}"#).unwrap();
        assert!(matches!(
            files.import_from_file(&bad),
            Err(DocumentFileError::Validation(_))
        ));
    }

    #[test]
    fn test_export_then_import_deeply_nested_outline() {
        let mut engine = MutationEngine::default();
        let mut parent = engine.create_root("Level 1").unwrap();
        for level in 2..=100 {
            parent = engine.create_child(parent, &format!("Level {level}")).unwrap();
        }
        engine.select_node(parent);
        let state = engine.into_state();

        let imported = import_document(&export_document(&state).unwrap()).unwrap();
        assert_eq!(imported, state);
    }

    #[test]
    fn test_import_rejects_largest_node_id_without_panicking() {
        let document = format!(
            r#"{{"nodes":[{{"id":{}, "title":"X"}}],"selectedNodeId":null,"openNodes":[]}}"#,
            u64::MAX
        );
        let err = import_document(&document).unwrap_err();
        assert!(err.message().contains("too large"), "{err}");
    }

    #[test]
    fn test_import_drops_selection_of_missing_node() {
        let mut state = sample_state();
        state.selected_node_id = Some(99);
        let imported = import_document(&export_document(&state).unwrap()).unwrap();
        assert_eq!(imported.selected_node_id, None);
        assert_eq!(imported.nodes, state.nodes);
    }
}
