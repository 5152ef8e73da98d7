//! Backend for the TaskAssassin app - proxies persona chat and mission
//! verification requests to Gemini
//!
//! A single JSON endpoint builds Gemini prompts for three actions, walks an
//! ordered list of models until one answers, and shapes the reply into the
//! small envelopes the app consumes. Row types for the app's relational
//! store and the push notification payload contract live alongside.

pub mod ai;
pub mod error;
pub mod extract;
pub mod image;
pub mod models;
pub mod prompts;
pub mod proxy;
pub mod push;
pub mod schema;
pub mod server;

pub use error::{Error, Result};
