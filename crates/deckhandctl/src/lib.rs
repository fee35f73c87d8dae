//! Library surface of the deckhand CLI, exposed so command handlers can be
//! exercised directly by integration tests.

pub mod commands;
