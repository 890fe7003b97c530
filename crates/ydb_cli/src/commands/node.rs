//! Single-node commands.

use std::io::Write;
use tracing::debug;
use ydb_core::Conn;

/// Runs the show command.
pub fn show(
    conn: &Conn,
    varname: &str,
    subscripts: &[String],
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(out, "{}", conn.node(varname, subscripts))?;
    Ok(())
}

/// Runs the set command.
pub fn set(
    conn: &Conn,
    varname: &str,
    subscripts: &[String],
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let node = conn.node(varname, subscripts);
    debug!(node = %node, len = value.len(), "set");
    node.set(value)?;
    Ok(())
}

/// Runs the get command.
pub fn get(
    conn: &Conn,
    varname: &str,
    subscripts: &[String],
    default: Option<&str>,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let node = conn.node(varname, subscripts);
    debug!(node = %node, "get");
    let value = match default {
        Some(default) => node.get_or(default)?,
        None => node.get()?,
    };
    writeln!(out, "{value}")?;
    Ok(())
}
