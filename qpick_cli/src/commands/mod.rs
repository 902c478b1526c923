//! CLI subcommands

pub mod health;
pub mod pick;
