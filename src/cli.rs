// Process entry glue shared by the binaries

use anyhow::{Result, bail};
use colored::*;
use std::io::Write;
use std::path::Path;
use crate::pipes::{Pipes, with_std_pipes};
use crate::registry::Registry;
use crate::util::{PipableCliUtil, invoke};

/// Prints `result`'s error (if any) to stderr and returns the exit code.
pub fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            1
        }
    }
}

/// Entry point for a single-util binary.
pub fn run_util<U: PipableCliUtil>(call: &[String]) -> i32 {
    let result = with_std_pipes(|pipes| invoke::<U>(call, pipes));
    exit_code(result)
}

/// Busybox-style dispatch: argv[0] names the util when it is a registered
/// name, otherwise argv[1] does and the call is shifted by one.
pub fn dispatch(registry: &Registry, args: &[String], pipes: &mut Pipes<'_>) -> Result<()> {
    let (name, call) = match args.first().map(|a| util_name(a)) {
        Some(invoked_as) if registry.contains(invoked_as) => (invoked_as, args),
        _ if args.len() >= 2 => (args[1].as_str(), &args[1..]),
        _ => {
            print_usage(registry, &mut *pipes.stderr)?;
            bail!("No util given");
        }
    };

    if !registry.contains(name) {
        print_usage(registry, &mut *pipes.stderr)?;
    }
    registry.call(name, call, pipes)
}

/// Util name an argv[0] refers to: `/usr/bin/rm` and `rm.exe` are both `rm`.
fn util_name(arg0: &str) -> &str {
    Path::new(arg0)
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or(arg0)
}

fn print_usage(registry: &Registry, err: &mut dyn Write) -> Result<()> {
    writeln!(err, "Usage: some <util> [args...]")?;
    writeln!(err, "Available utils:")?;
    for name in registry.names() {
        writeln!(err, "  {}", name)?;
    }
    Ok(())
}
