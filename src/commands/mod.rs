// ABOUTME: Command implementations behind the CLI
// ABOUTME: Exports the dump and source commands

pub mod dump;
pub mod source;

pub use dump::dump;
pub use source::source;
