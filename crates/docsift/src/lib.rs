//! # docsift
//!
//! **Document statistics, plagiarism detection, and word clouds over a
//! local corpus.**
//!
//! docsift analyzes one document at a time: it counts paragraphs, words
//! and characters, compares the text against every previously analyzed
//! document, and can render a word cloud of its significant words. Results
//! are stored in SQLite, so asking again returns the stored answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌────────────────┐   ┌──────────┐
//! │  Documents  │──▶│ AnalysisEngine │──▶│  SQLite   │
//! │  (content)  │   │ stats + Jaccard│   │ results   │
//! └─────────────┘   └───────┬────────┘   └──────────┘
//!                           │
//!                           ▼
//!                    ┌──────────────┐    ┌───────────┐
//!                    │ Word cloud   │──▶ │  Images    │
//!                    │ HTTP API     │    │  (files)   │
//!                    └──────────────┘    └───────────┘
//! ```
//!
//! Pure text logic (normalization, similarity, models, collaborator
//! traits) lives in `docsift-core`; this crate supplies the concrete
//! collaborators and the engine that drives them.
//!
//! ## Quick Start
//!
//! ```bash
//! docsift init
//! docsift analyze essay.txt --wordcloud
//! docsift wordcloud 0b6f...c1.png --output cloud.png
//! docsift similar essay.txt
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`analyze`] | The analysis engine |
//! | [`commands`] | CLI command bodies |
//! | [`config`] | TOML configuration |
//! | [`content_fs`] | Document content from a directory |
//! | [`db`] / [`migrate`] | SQLite pool and schema |
//! | [`logger`] | tracing-subscriber setup |
//! | [`retry`] | Exponential backoff for collaborators |
//! | [`sqlite_store`] | Result and similarity-edge persistence |
//! | [`wordcloud`] | Word-cloud rendering and image storage |

pub mod analyze;
pub mod commands;
pub mod config;
pub mod content_fs;
pub mod db;
pub mod logger;
pub mod migrate;
pub mod retry;
pub mod sqlite_store;
pub mod wordcloud;
