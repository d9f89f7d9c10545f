//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically; `--no-color`
//! and `color = false` in the config force plain output.
//! The `write_*` variants target any writer so the menu can be driven in tests.

use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}

/// Write error (red "Error:" prefix)
pub fn write_error(out: &mut impl Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{} {}", "Error:".red().bold(), msg)
}

/// Write success status (green checkmark)
pub fn write_success(out: &mut impl Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{} {}", "✓".green(), msg)
}

/// Write section header (cyan bold), preceded by a blank line
pub fn write_header(out: &mut impl Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "\n{}", msg.to_string().cyan().bold())
}

/// Write plain line
pub fn write_info(out: &mut impl Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}", msg)
}

/// Write prompt without newline (cyan) and flush
pub fn write_prompt(out: &mut impl Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    write!(out, "{} ", msg.to_string().cyan())?;
    out.flush()
}
