#![forbid(unsafe_code)]

//! a2am — Assistants-to-Agents Migrator.
//!
//! Library entry point exposing the migration API: copy assistants and
//! threads from the Azure OpenAI Assistants API into the Azure AI Agent
//! Service. The binary (`main.rs`) is a thin CLI wrapper around this
//! library.

pub mod auth;
pub mod backup;
pub mod clients;
pub mod config;
pub mod error;
pub mod migrate;
pub mod model;
