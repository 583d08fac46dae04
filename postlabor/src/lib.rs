//! Research agent for post-labor economics: topic selection, cache-aware
//! web research, LLM summaries and illustrations, persisted to libsql and
//! served over a small HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod illustration;
pub mod llm;
pub mod models;
pub mod research;
pub mod search;
pub mod services;
