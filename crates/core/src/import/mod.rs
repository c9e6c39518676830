//! Plain-text catalog import: line grouping and label mapping.
//!
//! The feed is line oriented, one `Label: Value` pair per line, with a blank
//! line closing each movie record:
//!
//! ```text
//! Title: Blazing Saddles
//! Release Year: 1974
//! Format: VHS
//! Stars: Mel Brooks, Clevon Little, Harvey Korman
//! ```
//!
//! [`parser`] turns a line stream into [`parser::ParsedRecordBlock`]s and
//! [`mapper`] converts each block into a [`crate::movie::CreateMovie`].

pub mod mapper;
pub mod parser;

pub use mapper::{canonical_field, import_label, map_record, CanonicalField, MalformedRecord};
pub use parser::{ParsedRecordBlock, RawField, RecordBlocks, TerminatedLines};
