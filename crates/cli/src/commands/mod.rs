// CLI subcommands

pub mod assistants;
pub mod chat;
pub mod run;
pub mod threads;
