//! Note summarization and persistence service.
//!
//! QuickNote accepts free-form note text over HTTP, turns it into a structured summary
//! (title, summary, tags, sentiment), and stores the result durably. It is the backend
//! the QuickNote mobile client talks to.
//!
//! # Architecture
//!
//! - **Storage**: SQLite via `rusqlite`, one connection behind a mutex, blocking work on
//!   the tokio blocking pool
//! - **Summarization**: pluggable [`summarizer::SummaryBackend`]: a local heuristic or
//!   the Hugging Face inference API, normalized at one boundary
//! - **Transport**: REST/JSON over axum
//!
//! # Modules
//!
//! - [`config`]: configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`notes`]: note model, Note Store, and statistics
//! - [`summarizer`]: summary backends and output normalization
//! - [`api`]: HTTP routes and error-to-status mapping
//! - [`server`]: process wiring and the listener

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod notes;
pub mod server;
pub mod summarizer;

pub use error::{Error, Result};
