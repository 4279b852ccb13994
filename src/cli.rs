use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::ConfigOverrides;
use crate::logging::DEFAULT_LOG_LEVEL;

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

pub fn styled_command() -> clap::Command {
    Cli::command()
}

#[derive(Debug, Parser)]
#[command(name = "studylog")]
#[command(bin_name = "studylog")]
#[command(version)]
#[command(about = "Track study time against a hosted or local record table")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'c',
        long,
        env = "STUDYLOG_CONFIG",
        help = "Config file (defaults to ./studylog.toml when present)."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'b',
        long,
        env = "STUDYLOG_BACKEND",
        help = "Record backend: sqlite or rest."
    )]
    pub backend: Option<String>,

    #[arg(
        short = 'd',
        long,
        env = "STUDYLOG_DB_PATH",
        help = "Path to the local SQLite database."
    )]
    pub db: Option<String>,

    #[arg(long, env = "STUDYLOG_REST_URL", help = "Base URL of the hosted database.")]
    pub rest_url: Option<String>,

    #[arg(
        long,
        env = "STUDYLOG_REST_KEY",
        hide_env_values = true,
        help = "API key for the hosted database."
    )]
    pub rest_key: Option<String>,

    #[arg(long, env = "STUDYLOG_TABLE", help = "Hosted table name.")]
    pub table: Option<String>,

    #[arg(
        long,
        env = "STUDYLOG_LOG",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter directive (error, warn, info, debug, trace)."
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend: self.backend.clone(),
            db: self.db.clone(),
            rest_url: self.rest_url.clone(),
            rest_key: self.rest_key.clone(),
            table: self.table.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "List study records and the total time.")]
    Ls(ListArgs),
    #[command(about = "Add a study record.")]
    Add(AddArgs),
    #[command(about = "Edit a study record; omitted fields keep their values.")]
    Edit(EditArgs),
    #[command(about = "Delete a study record.")]
    Rm(RemoveArgs),
    #[command(about = "Print the total study time.")]
    Total(TotalArgs),
    #[command(about = "Generate or install shell completions.")]
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, help = "Print JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(help = "What was studied.")]
    pub title: String,

    #[arg(allow_hyphen_values = true, help = "Hours spent.")]
    pub time: String,

    #[arg(long, help = "Print JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(help = "Record id.")]
    pub id: String,

    #[arg(short = 't', long, help = "New title.")]
    pub title: Option<String>,

    #[arg(long, allow_hyphen_values = true, help = "New hours.")]
    pub time: Option<String>,

    #[arg(long, help = "Print JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[arg(help = "Record id.")]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct TotalArgs {
    #[arg(long, help = "Print JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(help = "Shell name (bash, zsh, fish). Auto-detected if omitted.")]
    pub shell: Option<String>,

    #[arg(
        short = 'i',
        long = "install",
        help = "Write completions to the canonical path for the shell."
    )]
    pub install: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
