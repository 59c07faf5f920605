//! CLI command implementations.

pub mod apply;
pub mod capture;
pub mod common;
pub mod info;
pub mod library;
