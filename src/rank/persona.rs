//! Persona / job descriptor parsing.
//!
//! Accepts the nested challenge shape
//! (`{"persona": {"role": ..}, "job_to_be_done": {"task": ..}, "documents": [..]}`)
//! as well as flat `role`/`persona` and `job`/`task`/`job_to_be_done`/`todo` keys.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::PersonaQuery;

/// A document listed in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// File name within the input directory
    pub filename: String,
    /// Optional display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Parsed persona descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaDescriptor {
    /// Combined persona + job query
    pub query: PersonaQuery,
    /// Documents to rank, in order; empty means every PDF in the input directory
    pub documents: Vec<DocumentRef>,
}

impl PersonaDescriptor {
    /// Parse a descriptor from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Load a descriptor file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Interpret an already parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(root) = value else {
            return Err(Error::Config("persona descriptor must be a JSON object".to_string()));
        };

        let persona = match root.get("persona") {
            Some(Value::Object(obj)) => obj
                .get("role")
                .and_then(text_of)
                .or_else(|| obj.values().find_map(text_of)),
            Some(other) => text_of(other),
            None => None,
        }
        .or_else(|| root.get("role").and_then(text_of))
        .unwrap_or_default();

        let job = ["job", "task", "job_to_be_done", "todo"]
            .iter()
            .find_map(|key| root.get(*key).and_then(job_text))
            .unwrap_or_default();

        let documents = match root.get("documents") {
            Some(Value::Array(items)) => items.iter().filter_map(document_ref).collect(),
            Some(_) => {
                return Err(Error::Config("'documents' must be an array".to_string()));
            }
            None => Vec::new(),
        };

        Ok(Self {
            query: PersonaQuery::new(persona, job)?,
            documents,
        })
    }
}

/// Non-blank string content of a value.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Job text: a string, or an object carrying a `task`.
fn job_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => obj
            .get("task")
            .and_then(text_of)
            .or_else(|| obj.values().find_map(text_of)),
        other => text_of(other),
    }
}

fn document_ref(value: &Value) -> Option<DocumentRef> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(DocumentRef {
            filename: name.trim().to_string(),
            title: None,
        }),
        Value::Object(obj) => Some(DocumentRef {
            filename: obj.get("filename").and_then(text_of)?,
            title: obj.get("title").and_then(text_of),
        }),
        _ => None,
    }
}
