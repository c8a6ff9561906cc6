//! Run a command on a remote host and print the recovered result.
//!
//! Usage: `cargo run --example run -- alice@example.com 'uname -a'`

use ssh_exec::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let hostspec = args.next().unwrap_or_else(|| "localhost".to_string());
    let command = args.next().unwrap_or_else(|| "uname -a".to_string());

    let backend = SshBackend::safe(&hostspec, BackendConfig::default())?;
    let result = backend.run(&command).await?;

    print!("{}", result.stdout_lossy());
    eprint!("{}", result.stderr_lossy());
    std::process::exit(result.exit_status);
}
