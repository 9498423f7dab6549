use std::path::Path;

use eyre::{Result, WrapErr};
use tracing::warn;

use repgen_core::models::patient::PatientQuery;
use repgen_core::models::template::TemplateKind;
use repgen_export::ExportPipeline;
use repgen_export::docx::generate_scaffold;
use repgen_figures::fonts::FontResolver;
use repgen_report::{
    ContextBuilder, GenerateRequest, GeneratedReport, MissingDataPolicy, generate, scaffold_for,
};
use repgen_store::PatientStore;

use crate::cli::{Command, ConfigCommand, DbCommand, GenerateArgs, TemplateCommand};
use crate::config::{self, RepgenConfig};

/// Run one parsed command against the loaded configuration.
pub fn run(command: Command, config: &RepgenConfig, config_path: Option<&Path>) -> Result<()> {
    match command {
        Command::Report(args) => run_generate(config, TemplateKind::Report, &args),
        Command::Annex(args) => run_generate(config, TemplateKind::Annex, &args),
        Command::Convert { docx, out_dir } => {
            let pipeline = ExportPipeline::from_settings(&config.export);
            let pdf = match out_dir {
                Some(dir) => pipeline.export_to(&docx, &dir)?,
                None => pipeline.export(&docx)?,
            };
            println!("PDF: {}", pdf.display());
            Ok(())
        }
        Command::Converters => {
            for (name, available) in ExportPipeline::from_settings(&config.export).availability() {
                let status = if available { "available" } else { "not found" };
                println!("{name:<12} {status}");
            }
            Ok(())
        }
        Command::Db {
            command: DbCommand::Init { with_samples },
        } => db_init(&config.database, with_samples),
        Command::Template {
            command: TemplateCommand::Scaffold { kind, out },
        } => scaffold(config, kind, &out),
        Command::Config { command } => {
            let path = match config_path {
                Some(p) => p.to_path_buf(),
                None => config::default_config_path()?,
            };
            match command {
                ConfigCommand::Show => {
                    println!("# {}", path.display());
                    println!("{}", serde_json::to_string_pretty(config)?);
                    Ok(())
                }
                ConfigCommand::Init { force } => {
                    if path.exists() && !force {
                        eyre::bail!(
                            "config already exists at {} (use --force to overwrite)",
                            path.display()
                        );
                    }
                    config::save_config(&RepgenConfig::default(), &path)?;
                    println!("Config written to {}", path.display());
                    Ok(())
                }
            }
        }
    }
}

/// Generate a document and, unless disabled, its PDF. The Word document
/// path is printed before conversion starts so it is reported even when
/// the PDF step fails.
pub fn run_generate(config: &RepgenConfig, kind: TemplateKind, args: &GenerateArgs) -> Result<()> {
    let report = generate_document(config, kind, args)?;

    println!("Word document: {}", report.docx.display());
    for item in &report.missing {
        println!("  missing: {item}");
    }

    if args.no_pdf {
        return Ok(());
    }
    let pdf = ExportPipeline::from_settings(&config.export)
        .export(&report.docx)
        .wrap_err("PDF export failed, the Word document was kept")?;
    println!("PDF: {}", pdf.display());
    Ok(())
}

pub fn generate_document(
    config: &RepgenConfig,
    kind: TemplateKind,
    args: &GenerateArgs,
) -> Result<GeneratedReport> {
    let store = PatientStore::open(&config.database)
        .wrap_err_with(|| format!("opening database {}", config.database.display()))?;
    let query = PatientQuery::new(args.by, &args.value)?;

    let policy = if args.allow_partial {
        MissingDataPolicy::Partial
    } else {
        MissingDataPolicy::Strict
    };
    let out_dir = args
        .out_dir
        .clone()
        .or_else(|| config.out_dir.clone())
        .unwrap_or_else(|| args.workdir.clone());

    let request = GenerateRequest {
        query,
        kind,
        lang: args.lang,
        workdir: args.workdir.clone(),
        templates_dir: config.templates_dir.clone(),
        out_dir,
        report_date: args.date.unwrap_or_else(|| jiff::Zoned::now().date()),
        policy,
    };

    let mut builder = ContextBuilder::new(
        &config.report,
        FontResolver::with_system_dirs(config.font_dirs.clone()),
    );
    let report = generate(&mut builder, &store, &request)?;
    if !report.missing.is_empty() {
        warn!(
            missing = report.missing.len(),
            "document generated with empty placeholders"
        );
    }
    Ok(report)
}

pub fn db_init(database: &Path, with_samples: bool) -> Result<()> {
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let store = PatientStore::create(database)
        .wrap_err_with(|| format!("creating database {}", database.display()))?;

    if with_samples {
        let inserted = store.seed_samples()?;
        println!("Inserted {inserted} sample patients");
    }
    println!(
        "Database ready at {} ({} patients)",
        database.display(),
        store.count()?
    );
    Ok(())
}

pub fn scaffold(config: &RepgenConfig, kind: TemplateKind, out: &Path) -> Result<()> {
    let content = scaffold_for(kind, &config.report);
    let bytes = generate_scaffold(kind, &content, &config.styles)?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, bytes).wrap_err_with(|| format!("writing {}", out.display()))?;
    println!("Template written to {}", out.display());
    Ok(())
}
