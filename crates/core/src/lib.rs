//! Core library for jiramark
//!
//! This crate implements the **Functional Core** of the jiramark application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The jiramark project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`jiramark_core`** (this crate): Pure transformation functions with zero I/O
//! - **`jiramark`**: Clipboard access, terminal output and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Total**: Every input maps to some output, malformed Markdown included
//! - **Testable**: Can be tested with simple fixture strings, no clipboard required
//!
//! # Module Organization
//!
//! - [`jira`]: Markdown to Jira Wiki Markup conversion
//! - [`payload`]: Markdown extraction from rich (HTML) clipboard payloads
//!
//! # Example Usage
//!
//! ```rust
//! use jiramark_core::markdown_to_jira;
//!
//! let jira = markdown_to_jira("## Summary\n**bold** and *italic*");
//! assert_eq!(jira, "h2. Summary\n*bold* and _italic_");
//! ```

pub mod jira;
pub mod payload;

pub use jira::{convert, markdown_to_jira, ConvertOptions};
pub use payload::{markdown_from_payload, Extraction, Origin};
