//! Lead Intake API Library
//!
//! Takes lead submissions (name, age, email) from the landing page form,
//! validates them, and hands them to exactly one backend: the external lead
//! API or the `usuarios` table.
//!
//! # Modules
//!
//! - `config`: Configuration management and backend selection.
//! - `credentials`: Placeholder credential generation and hashing.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Database backend for leads.
//! - `errors`: Error types and their HTTP mapping.
//! - `gateway_client`: External lead API backend.
//! - `handlers`: HTTP request handlers.
//! - `lead_sink`: The backend trait shared by both backends.
//! - `models`: Lead data models.
//! - `routes`: Router and middleware assembly.
//! - `validation`: Lead field validation and normalization.

pub mod config;
pub mod credentials;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod gateway_client;
pub mod handlers;
pub mod lead_sink;
pub mod models;
pub mod routes;
pub mod validation;
