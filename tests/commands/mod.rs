//! Tests for the knowledge graph commands

mod test_build;
mod test_chat_loop;
