//! JSON rendering for outlines and ranking reports.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Outline, PersonaQuery, RankedSection};
use crate::rank::Subsection;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any value to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Render an outline as `{title, outline: [{level, text, page}]}`.
pub fn outline_to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    to_json(outline, format)
}

/// Output file name for a document's outline (`report.pdf` -> `report.json`).
pub fn outline_file_name(document: &str) -> String {
    let stem = Path::new(document)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| document.to_string());
    format!("{}.json", stem)
}

/// Write rendered output, creating parent directories as needed.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    let fail = |source| Error::OutputWriteFailure {
        path: PathBuf::from(path),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }
    std::fs::write(path, contents).map_err(fail)
}

/// Run metadata of a ranking report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Documents that took part in the ranking, in submission order
    pub input_documents: Vec<String>,
    /// Persona description
    pub persona: String,
    /// Job-to-be-done description
    pub job_to_be_done: String,
    /// RFC 3339 time the report was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_timestamp: Option<String>,
}

/// One selected section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    /// Source document identifier
    pub document: String,
    /// Section heading (document title for a preamble)
    pub section_title: String,
    /// Trimmed snippet of the section text
    pub refined_text: String,
    /// First page of the section
    pub page_number: u32,
    /// 1-based dense rank
    pub importance_rank: usize,
}

/// Best-matching sentences of a selected section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    /// Source document identifier
    pub document: String,
    /// Selected sentences
    pub refined_text: String,
    /// First page of the section
    pub page_number: u32,
}

/// Ranking output for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    /// Run metadata
    pub metadata: ReportMetadata,
    /// Selected sections in rank order
    pub extracted_sections: Vec<ExtractedSection>,
    /// Sentence-level analysis of the selected sections, in rank order
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl RankingReport {
    /// Assemble a report from ranking results.
    pub fn new(
        input_documents: Vec<String>,
        query: &PersonaQuery,
        ranked: &[RankedSection<'_>],
        subsections: &[Subsection<'_>],
    ) -> Self {
        let extracted_sections = ranked
            .iter()
            .map(|r| ExtractedSection {
                document: r.section.document.clone(),
                section_title: r.section.title.clone(),
                refined_text: r.snippet.clone(),
                page_number: r.section.start_page,
                importance_rank: r.rank,
            })
            .collect();

        let subsection_analysis = subsections
            .iter()
            .filter(|s| !s.text.is_empty())
            .map(|s| SubsectionAnalysis {
                document: s.section.document.clone(),
                refined_text: s.text.clone(),
                page_number: s.section.start_page,
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                input_documents,
                persona: query.persona.clone(),
                job_to_be_done: query.job.clone(),
                processing_timestamp: None,
            },
            extracted_sections,
            subsection_analysis,
        }
    }

    /// Stamp the report with a processing time.
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.metadata.processing_timestamp = Some(at.to_rfc3339_opts(SecondsFormat::Secs, true));
        self
    }

    /// Stamp the report with the current time.
    pub fn stamped_now(self) -> Self {
        self.with_timestamp(Utc::now())
    }

    /// Render the report.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(self, format)
    }
}
