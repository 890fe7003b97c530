//! Script execution.
//!
//! A script runs one command per line against a single connection, so the
//! in-memory engine keeps its state from one line to the next.
//!
//! ```text
//! # comment
//! set ^var sub1 sub2 = 3
//! get ^var sub1 sub2
//! get ^var sub1 nope = "no value"
//! show ^var "with space"
//! ```
//!
//! Tokens are separated by whitespace. A token in double quotes may contain
//! whitespace, `\"` and `\\`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use ydb_core::{Conn, YdbError};

/// Errors that stop a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Reading the script or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// The engine rejected a command.
    #[error("line {line}: {source}")]
    Ydb {
        /// 1-based line number.
        line: usize,
        /// The engine's error.
        source: YdbError,
    },
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show {
        key: Vec<String>,
    },
    Set {
        key: Vec<String>,
        value: String,
    },
    Get {
        key: Vec<String>,
        default: Option<String>,
    },
}

/// Runs the script in `path`.
pub fn run_file(conn: &Conn, path: &Path, out: &mut impl Write) -> Result<(), ScriptError> {
    let script = fs::read_to_string(path)?;
    info!(path = %path.display(), "running script");
    run(conn, &script, out)
}

/// Runs every line of `script`, stopping at the first failure.
pub fn run(conn: &Conn, script: &str, out: &mut impl Write) -> Result<(), ScriptError> {
    let mut executed = 0usize;
    for (index, text) in script.lines().enumerate() {
        let line = index + 1;
        let parsed = parse_line(text).map_err(|message| ScriptError::Parse { line, message })?;
        let Some(command) = parsed else {
            continue;
        };
        debug!(line, ?command, "executing");
        execute(conn, &command, out).map_err(|err| match err {
            Failure::Io(err) => ScriptError::Io(err),
            Failure::Ydb(source) => ScriptError::Ydb { line, source },
        })?;
        executed += 1;
    }
    debug!(executed, "script finished");
    Ok(())
}

enum Failure {
    Io(io::Error),
    Ydb(YdbError),
}

impl From<io::Error> for Failure {
    fn from(err: io::Error) -> Self {
        Failure::Io(err)
    }
}

impl From<YdbError> for Failure {
    fn from(err: YdbError) -> Self {
        Failure::Ydb(err)
    }
}

fn execute(conn: &Conn, command: &Command, out: &mut impl Write) -> Result<(), Failure> {
    match command {
        Command::Show { key } => {
            writeln!(out, "{}", conn.node_from(key.as_slice()))?;
        }
        Command::Set { key, value } => {
            conn.node_from(key.as_slice()).set(value)?;
        }
        Command::Get { key, default } => {
            let node = conn.node_from(key.as_slice());
            let value = match default {
                Some(default) => node.get_or(default)?,
                None => node.get()?,
            };
            writeln!(out, "{value}")?;
        }
    }
    Ok(())
}

/// Parses one line. Blank lines and comments yield `None`.
fn parse_line(text: &str) -> Result<Option<Command>, String> {
    let tokens = tokenize(text)?;
    let Some((verb, rest)) = tokens.split_first() else {
        return Ok(None);
    };
    if verb.text.starts_with('#') && !verb.quoted {
        return Ok(None);
    }

    let (key, trailing) = match rest.iter().position(|t| t.is_assign()) {
        Some(at) => {
            let value = match &rest[at + 1..] {
                [value] => value.text.clone(),
                [] => return Err("missing value after '='".to_string()),
                _ => return Err("expected exactly one value after '='".to_string()),
            };
            (&rest[..at], Some(value))
        }
        None => (rest, None),
    };
    if key.is_empty() {
        return Err(format!("{} needs a variable name", verb.text));
    }
    let key: Vec<String> = key.iter().map(|t| t.text.clone()).collect();

    let command = match (verb.text.as_str(), trailing) {
        ("show", None) => Command::Show { key },
        ("show", Some(_)) => return Err("show takes no value".to_string()),
        ("set", Some(value)) => Command::Set { key, value },
        ("set", None) => return Err("set needs '= value'".to_string()),
        ("get", default) => Command::Get { key, default },
        (other, _) => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

#[derive(Debug)]
struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    fn is_assign(&self) -> bool {
        !self.quoted && self.text == "="
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut token = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped @ ('"' | '\\')) => token.push(escaped),
                        Some(other) => return Err(format!("unknown escape '\\{other}'")),
                        None => return Err("unterminated string".to_string()),
                    },
                    Some(ch) => token.push(ch),
                    None => return Err("unterminated string".to_string()),
                }
            }
            tokens.push(Token {
                text: token,
                quoted: true,
            });
        } else {
            let mut token = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() || ch == '"' {
                    break;
                }
                token.push(ch);
                chars.next();
            }
            tokens.push(Token {
                text: token,
                quoted: false,
            });
        }
    }
    Ok(tokens)
}
