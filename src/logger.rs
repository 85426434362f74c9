use crate::driver::CompilerError;
use colored::Colorize;

pub fn info(message: &str) {
    println!("{} {message}", "[INFO]".yellow().bold());
}

pub fn debug(message: &str) {
    println!("{} {}", "[DEBUG]".magenta().bold(), message.italic());
}

/// Framed banner showing which component raised the error and why.
pub fn error(err: &CompilerError) {
    eprintln!("{}", "╔════════════════════════════════╗".red().bold());
    eprintln!("{}", "║       ⚠ ERROR OCCURRED ⚠       ║".red().bold());
    eprintln!("{}", "╚════════════════════════════════╝".red().bold());
    eprintln!("{} {}", "⮞ Raised by:".yellow().bold(), err.where_tag());
    eprintln!("{} {}", "⮞ Reason:   ".yellow().bold(), err.what());
}
