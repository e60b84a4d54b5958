//! Pure domain types and logic for the construction-project platform client.
//!
//! This crate has no I/O: it holds the models shared between the REST
//! gateway, the view models, and any future tooling, plus the small pieces
//! of behavior that must not drift between views -- the order status
//! transition table, tab visibility, display progress estimation, the chat
//! merge protocol, the document version reducer, and application triage.

pub mod application;
pub mod camera;
pub mod chat;
pub mod document;
pub mod error;
pub mod order;
pub mod order_status;
pub mod roles;
pub mod stage;
pub mod types;
