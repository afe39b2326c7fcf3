//! Task-tracking backend: CRUD and status filtering of tasks over HTTP + JSON,
//! stored in PostgreSQL or in memory.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
