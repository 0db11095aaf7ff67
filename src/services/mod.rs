//! Data-consistency layer between the HTTP handlers and SQLite.

pub mod cascade;
pub mod generator;
pub mod integrity;
pub mod inventory_service;
