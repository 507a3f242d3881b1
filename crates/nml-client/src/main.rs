//! Entry point for the NML language client host.
//!
//! Delegates to [`nml_client::run`]. Standard output is passed unlocked
//! because `run` relays the protocol stream through it from another thread.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    nml_client::run(std::env::args_os(), &mut stdout, &mut stderr)
}
