//! Rendering module for outline and ranking output.

mod json;

pub use json::{
    outline_file_name, outline_to_json, to_json, write_output, ExtractedSection, JsonFormat,
    RankingReport, ReportMetadata, SubsectionAnalysis,
};
