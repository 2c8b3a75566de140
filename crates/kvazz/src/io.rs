//! Output sink abstraction for the `print` builtin.
//!
//! The library never touches real stdout directly; `exec` wires a
//! `StdPrint` in, and tests wire a `CollectPrint` in so assertions can
//! inspect output without capturing the process's actual standard streams.

use std::io::Write;

/// A sink the `print` builtin writes completed lines to.
pub trait PrintWriter {
    fn print_line(&mut self, line: &str);
}

/// Writes to real standard output, used by the CLI driver.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn print_line(&mut self, line: &str) {
        let mut stdout = std::io::stdout();
        let _ = writeln!(stdout, "{line}");
    }
}

/// Appends each line to an in-memory buffer, used by tests.
#[derive(Debug, Default)]
pub struct CollectPrint {
    pub lines: Vec<String>,
}

impl CollectPrint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn joined(&self) -> String {
        self.lines.iter().map(|l| format!("{l}\n")).collect()
    }
}

impl PrintWriter for CollectPrint {
    fn print_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_print_joins_with_newlines() {
        let mut sink = CollectPrint::new();
        sink.print_line("hello");
        sink.print_line("world");
        assert_eq!(sink.joined(), "hello\nworld\n");
    }
}
