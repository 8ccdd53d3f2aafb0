use super::LaunchOutcome;
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn header<W: Write>(out: &mut W, app_name: &str, root: &Path) -> io::Result<()> {
    writeln!(out, "{}", rule().blue())?;
    writeln!(out, "  {} {}", "Starting".bold(), app_name.cyan().bold())?;
    writeln!(out, "  Root: {}", root.display().to_string().yellow())?;
    writeln!(out, "{}", rule().blue())?;
    Ok(())
}

pub fn activation_ok<W: Write>(out: &mut W, venv: &str) -> io::Result<()> {
    writeln!(
        out,
        "{} Virtual environment activated: {}",
        "✓".green().bold(),
        venv.yellow()
    )
}

pub fn activation_failed<W: Write>(out: &mut W, sentinel: &str) -> io::Result<()> {
    writeln!(out, "{}", rule().red())?;
    writeln!(
        out,
        "{} {}",
        "✗".red().bold(),
        "ERROR: virtual environment could not be activated".red().bold()
    )?;
    writeln!(out, "  {} is empty or unset after activation", sentinel.cyan())?;
    writeln!(out, "{}", rule().red())?;
    Ok(())
}

pub fn launching<W: Write>(out: &mut W, entry_point: &Path) -> io::Result<()> {
    writeln!(
        out,
        "{} Launching {}",
        "→".blue().bold(),
        entry_point.display().to_string().cyan()
    )?;
    writeln!(out)?;
    Ok(())
}

pub fn summary<W: Write>(out: &mut W, outcome: &LaunchOutcome) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", rule().blue())?;
    match outcome {
        LaunchOutcome::Succeeded => writeln!(
            out,
            "{} {}",
            "✓".green().bold(),
            "Application exited successfully".green().bold()
        )?,
        LaunchOutcome::ChildFailed { code } => writeln!(
            out,
            "{} {}",
            "⚠".yellow().bold(),
            format!("Application exited with error code {}", code)
                .yellow()
                .bold()
        )?,
    }
    writeln!(out, "{}", rule().blue())?;
    Ok(())
}
