//! Captured drill run and its on-disk text format.
//!
//! ```text
//! $ go run double.go
//! 4
//! ```
//!
//! The first line is the invocation behind a shell prompt, the remaining
//! bytes are the combined stdout and stderr of the program, unframed.

/// Shell prompt marker in front of the invocation line.
pub const PROMPT: &str = "$ ";

/// A captured drill run: the command line and everything it printed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    invocation: String,
    output: Vec<u8>,
}

impl RunResult {
    /// Create a result from an invocation line (without prompt) and output.
    #[must_use]
    pub fn new(invocation: impl Into<String>, output: Vec<u8>) -> Self {
        Self {
            invocation: invocation.into(),
            output,
        }
    }

    /// Parse the text format.
    ///
    /// Lenient: a missing prompt leaves the first line as is, and input
    /// without a newline is an invocation with empty output.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let (line, output) = match bytes.iter().position(|&b| b == b'\n') {
            Some(pos) => (&bytes[..pos], &bytes[pos + 1..]),
            None => (bytes, &[][..]),
        };
        let line = String::from_utf8_lossy(line);
        let invocation = line.strip_prefix(PROMPT).unwrap_or(&line);
        Self {
            invocation: invocation.to_owned(),
            output: output.to_vec(),
        }
    }

    /// Serialize to the text format.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(PROMPT.len() + self.invocation.len() + 1 + self.output.len());
        buf.extend_from_slice(PROMPT.as_bytes());
        buf.extend_from_slice(self.invocation.as_bytes());
        buf.push(b'\n');
        buf.extend_from_slice(&self.output);
        buf
    }

    /// Invocation line without the prompt.
    #[must_use]
    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    /// Combined stdout and stderr.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}
