//! Ledger Sync Server Library
//!
//! The request-normalization and incremental-sync layer of the Ledger
//! personal-finance API. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `locale`: `Accept-Language` negotiation and the message catalog
//! - `datetime`: timezone-aware normalization of client timestamps
//! - `sync`: the incremental sync query builder and its envelope
//! - `context` / `middleware`: per-request context and the HTTP boundary

pub mod config;
pub mod context;
pub mod datetime;
pub mod db;
pub mod error;
pub mod locale;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod sync;
