// ABOUTME: Library module for mysql-sqldump
// ABOUTME: Exports the dump and restore engines for use in the binary and tests

pub mod commands;
pub mod config;
pub mod dump;
pub mod error;
pub mod literal;
pub mod mysql;
pub mod restore;
pub mod sink;
pub mod writer;

pub use error::SqlDumpError;
