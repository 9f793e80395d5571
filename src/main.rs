//! CLI entry point for meraki
//!
//! Provides command-line access to the pipeline: validating configs,
//! listing bindings, and rewriting files in canonical form.

use clap::{Parser as ClapParser, Subcommand};
use colored::*;
use meraki::core::{parse_document, validator::Validator, Document};
use meraki::format::Formatter;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(ClapParser)]
#[command(name = "meraki")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a config, reporting errors and warnings
    Check {
        /// Path to a Meraki config file
        #[arg(short, long, default_value = "~/.config/meraki/merakirc")]
        config: PathBuf,

        /// Emit the validation result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all modifier aliases and keybindings
    List {
        /// Path to a Meraki config file
        #[arg(short, long, default_value = "~/.config/meraki/merakirc")]
        config: PathBuf,
    },

    /// Print the config in canonical formatting
    Fmt {
        /// Path to a Meraki config file
        #[arg(short, long, default_value = "~/.config/meraki/merakirc")]
        config: PathBuf,

        /// Rewrite the file in place instead of printing
        #[arg(short, long)]
        write: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config, json } => check_config(&config, json)?,
        Commands::List { config } => list_bindings(&config)?,
        Commands::Fmt { config, write } => format_config(&config, write)?,
    }

    Ok(())
}

/// Expands a tilde path and reads the config file.
fn read_config(config_path: &Path) -> anyhow::Result<(PathBuf, String)> {
    let expanded = shellexpand::tilde(
        config_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?,
    );
    let path = PathBuf::from(expanded.as_ref());

    let content = fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;

    Ok((path, content))
}

/// Parses the file, exiting with status 1 on lexical or parse errors.
fn parse_or_exit(path: &Path, content: &str) -> Document {
    match parse_document(content) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{} {}: {}", "✗".red().bold(), path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Validate a config and report findings
fn check_config(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let (path, content) = read_config(config_path)?;

    let doc = parse_or_exit(&path, &content);
    let result = Validator::new().validate(&doc);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.is_valid {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!("{} Parsed config: {}", "→".cyan(), path.display());
    println!(
        "{} Found {} modifiers and {} keybindings\n",
        "✓".green(),
        doc.modifiers.len(),
        doc.keybindings.len()
    );

    for warning in &result.warnings {
        println!(
            "{} line {}: {}",
            "⚠ warning".yellow().bold(),
            warning.line_number,
            warning.message
        );
    }
    for error in &result.errors {
        println!(
            "{} line {}: {}",
            "✗ error".red().bold(),
            error.line_number,
            error.message
        );
    }

    if result.is_valid {
        if result.warnings.is_empty() {
            println!("{} {}", "✓".green().bold(), "No issues found!".bold());
        } else {
            println!(
                "\n{} Valid with {} warning{}",
                "✓".green().bold(),
                result.warnings.len(),
                if result.warnings.len() == 1 { "" } else { "s" }
            );
        }
    } else {
        println!(
            "\n{} {} error{} found",
            "✗".red().bold(),
            result.errors.len(),
            if result.errors.len() == 1 { "" } else { "s" }
        );
        std::process::exit(1);
    }

    Ok(())
}

/// List every alias and binding in the config
fn list_bindings(config_path: &Path) -> anyhow::Result<()> {
    let (path, content) = read_config(config_path)?;
    let doc = parse_or_exit(&path, &content);

    println!("{}", format!("Bindings from: {}\n", path.display()).bold());

    for def in &doc.modifiers {
        println!(
            "{} = {}",
            def.name.cyan().bold(),
            def.keys.join(" + ").green()
        );
    }
    if !doc.modifiers.is_empty() {
        println!();
    }

    for binding in &doc.keybindings {
        println!(
            "{} → {}",
            binding.trigger().cyan().bold(),
            binding.body_summary()
        );
    }

    println!(
        "\n{} Total: {} bindings",
        "✓".green(),
        doc.keybindings.len()
    );

    Ok(())
}

/// Print or rewrite the config in canonical form. Configs with
/// validation errors are reported and left untouched.
fn format_config(config_path: &Path, write: bool) -> anyhow::Result<()> {
    let (path, content) = read_config(config_path)?;
    let doc = parse_or_exit(&path, &content);

    let result = Validator::new().validate(&doc);
    if !result.is_valid {
        for error in &result.errors {
            eprintln!(
                "{} line {}: {}",
                "✗ error".red().bold(),
                error.line_number,
                error.message
            );
        }
        anyhow::bail!(
            "{} has {} validation error{}; refusing to format",
            path.display(),
            result.errors.len(),
            if result.errors.len() == 1 { "" } else { "s" }
        );
    }

    let formatted = Formatter::new().format(&doc);

    if write {
        fs::write(&path, &formatted)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
        println!("{} Rewrote {}", "✓".green(), path.display());
    } else {
        print!("{}", formatted);
    }

    Ok(())
}
