// Pipable CLI util contract

use anyhow::{Result, bail};
use clap::Parser;
use clap::error::ErrorKind;
use log::debug;
use std::io::Write;
use crate::pipes::Pipes;

/// A util that can be parsed from an argument vector and executed once
/// against injected streams.
///
/// The implementing type is the command object itself: parsing builds it,
/// `exec` consumes it.
pub trait PipableCliUtil: Parser {
    const NAME: &'static str;

    fn exec(self, pipes: &mut Pipes<'_>) -> Result<()>;
}

/// Result of a successful parse.
#[derive(Debug)]
pub enum Parsed<U> {
    /// Flags were valid; the command object is ready to execute.
    Ready(U),
    /// Help or version text was printed. Nothing else should run.
    Exit,
}

/// Parses `call` (argv, including the util name at index 0).
///
/// Help and version requests are written to `stderr` and reported as
/// `Parsed::Exit`. Malformed flags are written to `stderr` with usage and
/// returned as an error.
pub fn parse_flags<U: PipableCliUtil>(call: &[String], stderr: &mut dyn Write) -> Result<Parsed<U>> {
    match U::try_parse_from(call) {
        Ok(util) => Ok(Parsed::Ready(util)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                write!(stderr, "{}", err.render())?;
                Ok(Parsed::Exit)
            }
            _ => {
                write!(stderr, "{}", err.render())?;
                bail!("{}: invalid arguments", U::NAME);
            }
        },
    }
}

/// Parse then execute, honoring the help/version short-circuit.
pub fn invoke<U: PipableCliUtil>(call: &[String], pipes: &mut Pipes<'_>) -> Result<()> {
    match parse_flags::<U>(call, &mut *pipes.stderr)? {
        Parsed::Ready(util) => {
            debug!("{}: executing", U::NAME);
            util.exec(pipes)
        }
        Parsed::Exit => Ok(()),
    }
}
