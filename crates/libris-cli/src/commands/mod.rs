//! Command handlers

pub mod book;
pub mod config;
pub mod lending;
pub mod reader;
pub mod status;
