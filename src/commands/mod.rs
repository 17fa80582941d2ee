//! Command implementations for the pbilocate CLI

pub mod completions;
pub mod find_server;
pub mod list;
pub mod locate;
pub mod shadow_copy;
