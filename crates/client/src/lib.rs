//! Async client for the construction-project platform backend.
//!
//! Layers, bottom up: [`config::ClientConfig`] (immutable, built once at
//! startup and injected), [`session`] (bearer-token identity decode),
//! [`gateway::RestGateway`] (typed REST access with uniform error
//! normalization), [`chat::ChatPoller`] (the fixed-interval message poller),
//! and [`orders`] (view-model orchestration over all of the above).

pub mod cache;
pub mod chat;
pub mod config;
pub mod gateway;
pub mod orders;
pub mod session;
