//! # VRM
//!
//! Terminal front end for the real and virtual machine emulator.
//!

mod term;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Real machine hosting paged virtual machines
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Program to load into real memory
    pub program: Option<PathBuf>,

    /// File backing external memory, kept in process when omitted
    #[arg(short, long)]
    pub external_memory: Option<PathBuf>,

    /// Timer value loaded by every STVM
    #[arg(short, long, default_value_t = vrm::mach::DEFAULT_TIMER)]
    pub timer: i32,

    /// Keep the external memory BUSY bit set after WD
    #[arg(long)]
    pub sticky_write_busy: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    term::main(Args::parse());
}
