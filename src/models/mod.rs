//! Data models for the company research pipeline.

mod company;
mod document;
mod run;
mod source;

pub use company::{ChangeRecord, Company, LocationEntry, RosterEntry};
pub use document::{
    BusinessSection, ExtractedDocument, FinancialsSection, IdentitySection, LinkSection,
    ScaleSection,
};
pub use run::{ResearchRun, RunOptions, RunStatus};
pub use source::SourceRecord;
