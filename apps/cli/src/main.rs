//! PolicyDiff CLI — compare client policy documents against a master.
//!
//! Finds clauses the client documents are missing, prints advisory
//! suggestions, and writes annotated client copies with the missing clauses
//! inserted and highlighted.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
