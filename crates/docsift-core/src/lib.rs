//! # docsift Core
//!
//! Runtime-free logic for docsift: lexical normalization, similarity
//! detection, data models, the engine error type, and the collaborator
//! traits the analysis engine is wired against.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or HTTP clients.
//! Concrete collaborators and the analysis orchestrator live in the
//! `docsift` app crate.

pub mod error;
pub mod models;
pub mod normalize;
pub mod similarity;
pub mod store;
