//! Checks over what the CLI printed.
//!
//! Everything here works on plain text. The contract id check relies on the id
//! being the last line the CLI prints; it lives here alone so that moving to
//! machine readable output only touches this module.

use crate::cli::Invocation;

/// Contract ids are strkeys: 56 characters starting with `C`.
pub const CONTRACT_ID_LEN: usize = 56;
pub const CONTRACT_ID_PREFIX: char = 'C';

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cli failed: {0}")]
    Failed(Box<Invocation>),
    #[error("expected stdout to contain {expected} {value:?}, got:\n{stdout}")]
    Missing {
        expected: &'static str,
        value: String,
        stdout: String,
    },
    #[error("expected a contract id on the last line, got {line:?} ({len} bytes)")]
    NotAContractId { line: String, len: usize },
    #[error("expected a contract id on the last line, got no output")]
    NoOutput,
}

/// A zero exit status is required before any output is looked at.
pub fn success(invocation: &Invocation) -> Result<&str, Error> {
    if invocation.success() {
        Ok(&invocation.stdout)
    } else {
        Err(Error::Failed(Box::new(invocation.clone())))
    }
}

pub fn contains_hash<'a>(stdout: &'a str, hash: &str) -> Result<&'a str, Error> {
    contains(stdout, "hash", hash)
}

/// Literal match on a fragment of JSON output such as `["Hello","world"]`.
/// Formatting differences are reported as mismatches.
pub fn contains_fragment<'a>(stdout: &'a str, fragment: &str) -> Result<&'a str, Error> {
    contains(stdout, "fragment", fragment)
}

fn contains<'a>(stdout: &'a str, expected: &'static str, value: &str) -> Result<&'a str, Error> {
    if stdout.contains(value) {
        Ok(stdout)
    } else {
        Err(Error::Missing {
            expected,
            value: value.to_string(),
            stdout: stdout.to_string(),
        })
    }
}

pub fn last_line(stdout: &str) -> Option<&str> {
    stdout.split('\n').filter(|l| !l.is_empty()).last()
}

/// Returns the contract id printed on the last non-empty line.
pub fn contract_id(stdout: &str) -> Result<&str, Error> {
    let line = last_line(stdout).ok_or(Error::NoOutput)?;
    // Strkeys are ASCII, so any other character already fails the length check.
    let len = line.len();
    if len == CONTRACT_ID_LEN && line.starts_with(CONTRACT_ID_PREFIX) {
        Ok(line)
    } else {
        Err(Error::NotAContractId {
            line: line.to_string(),
            len,
        })
    }
}
