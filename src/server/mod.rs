//! HTTP API over the shared translator

pub mod api;
