//! Core translation engine module

pub mod backend;
pub mod beam;
pub mod cache;
pub mod config;
pub mod dictionary;
pub mod dispatcher;
pub mod errors;
pub mod marian;
pub mod models;
