//! Runs the sample program as a process.
//!
//! `cargo run --example sample_main [args...]` passes the argument count as
//! `argc`, like a C entry point. `--global-init` adds the raising
//! initializer, which aborts the process before `main` runs.
//!
//! Set `RUST_LOG=raise_this=trace` to watch frames, regions and releases.

use anyhow::Result;
use raise_this::scenario::{self, global_init};
use raise_this::{terminate_on_fatal, Process};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let argc = i32::try_from(args.len())?;

    let mut process = Process::new();
    if args.iter().any(|a| a == "--global-init") {
        process = process.init("GLOBAL", global_init);
    }

    let code = terminate_on_fatal(process.run("main", |rt| scenario::main(rt, argc)));
    info!(argc, code, "main returned");
    println!("{}", code);
    Ok(())
}
