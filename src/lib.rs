//! SHAYAI Lead Intake API Library
//!
//! This library accepts lead submissions from the landing page, scores them
//! into a heat value and pool, and persists them to Postgres.
//!
//! # Modules
//!
//! - `api`: Router and middleware assembly.
//! - `classifier`: Heat scoring and pool classification.
//! - `config`: Configuration management.
//! - `db`: Database connection and storage lifecycle.
//! - `db_storage`: Lead persistence backends.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `intake`: Submission normalization.
//! - `models`: Lead records and API responses.
//! - `openapi`: OpenAPI document.

pub mod api;
pub mod classifier;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod intake;
pub mod models;
pub mod openapi;
