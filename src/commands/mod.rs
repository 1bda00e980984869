//! Command implementations
//!
//! Each module corresponds to a group of subcommands in the CLI.

pub mod graphrag;

pub use graphrag::{ask, build, chat, chat_loop, is_quit_command, StoreBackend};
