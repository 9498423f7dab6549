//! CLI argument parsing for repgen

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jiff::civil::Date;

use repgen_core::models::patient::SearchField;
use repgen_core::models::template::{Language, TemplateKind};

#[derive(Parser, Debug)]
#[command(name = "repgen")]
#[command(author, version, about = "Patient report generator", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the main report for a patient
    Report(GenerateArgs),

    /// Generate the annex for a patient
    Annex(GenerateArgs),

    /// Convert an existing Word document to PDF
    Convert {
        /// Word document to convert
        #[arg(required = true)]
        docx: PathBuf,

        /// Output directory (default: next to the document)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// List PDF converters and whether they are installed
    Converters,

    /// Patient database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },

    /// Template helpers
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },

    /// Show or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Patient ID, sample ID or name to look up
    #[arg(required = true)]
    pub value: String,

    /// Field the value is matched against
    #[arg(long, default_value = "patient-id")]
    pub by: SearchField,

    /// Directory with the score spreadsheets and figures
    #[arg(short, long)]
    pub workdir: PathBuf,

    /// Report language (de or en)
    #[arg(short, long, default_value = "de")]
    pub lang: Language,

    /// Only write the Word document
    #[arg(long)]
    pub no_pdf: bool,

    /// Continue with empty placeholders when score files or figures are missing
    #[arg(long)]
    pub allow_partial: bool,

    /// Report date as YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<Date>,

    /// Output directory (default: config out_dir, else the working directory)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Create the database and its schema
    Init {
        /// Insert the three demonstration patients
        #[arg(long)]
        with_samples: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// Write a starter template listing every placeholder
    Scaffold {
        /// report or annex
        #[arg(required = true)]
        kind: TemplateKind,

        /// Output .docx path
        #[arg(required = true)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a config file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
