//! CLI entrypoint wiring shared by the lexboxd binary.

use crate::config::ServerConfig;
use crate::server;
use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Compile-and-run service for Lex programs")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Directory per-request workspaces are created under
    #[arg(long)]
    scratch_root: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let defaults = ServerConfig::default();
    let config = ServerConfig {
        bind_addr: cli.bind,
        scratch_root: cli.scratch_root.unwrap_or(defaults.scratch_root),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(config))?;
    Ok(())
}
