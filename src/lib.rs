//! company-research - spreadsheet-driven corporate data enrichment.
//!
//! Reads a candidate list of corporate numbers from a spreadsheet, asks an
//! LLM extraction service for a structured profile of each company,
//! reconciles the result into SQLite, and mirrors each reconciled company
//! into a per-company worksheet.

// Model types use `from_str` methods that return Self (infallible parse),
// not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod normalize;
pub mod repository;
pub mod schema;
pub mod server;
pub mod services;
pub mod sheets;
