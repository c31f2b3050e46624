//! Data model for outline extraction and section ranking.
//!
//! Every stage produces a new read-only structure consumed by the next:
//! spans become blocks, blocks become heading candidates, candidates become an
//! outline, the outline carves sections, and sections are ranked.

mod block;
mod document;
mod outline;
mod query;
mod section;

pub use block::{TextBlock, TextSpan};
pub use document::LayoutDocument;
pub use outline::{
    BlockClass, DecisionSource, HeadingCandidate, HeadingLevel, Outline, OutlineNode, Signal,
    SignalKind,
};
pub use query::{PersonaQuery, RankedSection};
pub use section::{Section, SectionStart};
