//! Blocking variant of the `run` example.
//!
//! Usage: `cargo run --example sync_run -- alice@example.com 'uptime'`

use ssh_exec::prelude::*;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let hostspec = args.next().unwrap_or_else(|| "localhost".to_string());
    let command = args.next().unwrap_or_else(|| "uptime".to_string());

    let backend = SyncBackend::safe(&hostspec, BackendConfig::default())?;
    let result = backend.run(&command)?;

    println!("{} -> exit {}", backend.host(), result.exit_status);
    print!("{}", result.stdout_lossy());
    Ok(())
}
