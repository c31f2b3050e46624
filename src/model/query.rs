//! Ranking query and result types.

use serde::{Deserialize, Serialize};

use super::Section;
use crate::error::{Error, Result};

/// Persona description plus job-to-be-done, combined into one query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaQuery {
    /// Persona / role description
    pub persona: String,
    /// Job-to-be-done description
    pub job: String,
}

impl PersonaQuery {
    /// Create a query, rejecting blank combined text.
    pub fn new(persona: impl Into<String>, job: impl Into<String>) -> Result<Self> {
        let query = Self {
            persona: persona.into().trim().to_string(),
            job: job.into().trim().to_string(),
        };
        if query.text().is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(query)
    }

    /// Combined query text used for embedding.
    pub fn text(&self) -> String {
        match (self.persona.is_empty(), self.job.is_empty()) {
            (false, false) => format!("{}. {}", self.persona, self.job),
            (false, true) => self.persona.clone(),
            (true, false) => self.job.clone(),
            (true, true) => String::new(),
        }
    }
}

/// A section selected by the ranker.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSection<'a> {
    /// The ranked section
    pub section: &'a Section,
    /// Cosine similarity to the query (higher = more relevant)
    pub score: f32,
    /// 1-based dense rank
    pub rank: usize,
    /// Bounded-length extract of the section text
    pub snippet: String,
}
