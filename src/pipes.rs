use std::io::{self, Read, Write};

/// The stdin/stdout/stderr triple a util runs against.
///
/// Streams are borrowed for one execution, so tests can hand in byte buffers
/// and the binaries hand in locked process streams.
pub struct Pipes<'a> {
    pub stdin: &'a mut dyn Read,
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

impl<'a> Pipes<'a> {
    pub fn new(stdin: &'a mut dyn Read, stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self { stdin, stdout, stderr }
    }
}

/// Runs `f` with the real process streams locked into a `Pipes`.
pub fn with_std_pipes<T>(f: impl FnOnce(&mut Pipes<'_>) -> T) -> T {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut inp = stdin.lock();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    let mut pipes = Pipes::new(&mut inp, &mut out, &mut err);
    let result = f(&mut pipes);
    let _ = pipes.stdout.flush();
    result
}
