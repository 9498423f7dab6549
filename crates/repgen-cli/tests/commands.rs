use std::path::PathBuf;

use clap::Parser;

use repgen_cli::cli::{Cli, Command, ConfigCommand, DbCommand, TemplateCommand};
use repgen_cli::commands::{db_init, generate_document, run, scaffold};
use repgen_cli::config::RepgenConfig;
use repgen_core::models::patient::SearchField;
use repgen_core::models::template::{Language, TemplateKind};

#[test]
fn parses_report_arguments() {
    let cli = Cli::try_parse_from([
        "repgen",
        "report",
        "Smith",
        "--by",
        "name",
        "--workdir",
        "/tmp/work",
        "--lang",
        "EN",
        "--no-pdf",
        "--date",
        "2026-10-18",
        "--config",
        "/tmp/repgen.json",
    ])
    .unwrap();

    assert_eq!(cli.config, Some(PathBuf::from("/tmp/repgen.json")));
    match cli.command {
        Command::Report(args) => {
            assert_eq!(args.value, "Smith");
            assert_eq!(args.by, SearchField::Name);
            assert_eq!(args.lang, Language::En);
            assert!(args.no_pdf);
            assert!(!args.allow_partial);
            assert_eq!(args.date, Some(jiff::civil::date(2026, 10, 18)));
        }
        other => panic!("expected report, got {other:?}"),
    }
}

#[test]
fn generate_defaults() {
    let cli = Cli::try_parse_from(["repgen", "annex", "1234", "--workdir", "w"]).unwrap();
    match cli.command {
        Command::Annex(args) => {
            assert_eq!(args.by, SearchField::PatientId);
            assert_eq!(args.lang, Language::De);
            assert!(args.date.is_none());
        }
        other => panic!("expected annex, got {other:?}"),
    }
}

#[test]
fn rejects_unknown_language_and_missing_workdir() {
    assert!(Cli::try_parse_from(["repgen", "report", "1", "--workdir", "w", "--lang", "fr"]).is_err());
    assert!(Cli::try_parse_from(["repgen", "report", "1"]).is_err());
}

#[test]
fn parses_maintenance_commands() {
    let cli = Cli::try_parse_from(["repgen", "template", "scaffold", "annex", "out.docx"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Template {
            command: TemplateCommand::Scaffold {
                kind: TemplateKind::Annex,
                ..
            }
        }
    ));

    let cli = Cli::try_parse_from(["repgen", "db", "init", "--with-samples"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Db {
            command: DbCommand::Init { with_samples: true }
        }
    ));

    let cli = Cli::try_parse_from(["repgen", "config", "init", "--force"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Config {
            command: ConfigCommand::Init { force: true }
        }
    ));
}

#[test]
fn annex_from_scaffold_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let workdir = dir.path().join("work");
    std::fs::create_dir_all(&workdir).unwrap();

    let mut config = RepgenConfig::default();
    config.database = dir.path().join("db").join("patients.db");
    config.templates_dir = dir.path().join("templates");
    config.font_dirs = Vec::new();
    config.report.distributions.data_dir = Some(dir.path().join("reference"));

    db_init(&config.database, true).unwrap();
    scaffold(
        &config,
        TemplateKind::Annex,
        &config.templates_dir.join("template_annex.docx"),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "repgen",
        "annex",
        "Charlie",
        "--by",
        "name",
        "--workdir",
        workdir.to_str().unwrap(),
        "--no-pdf",
        "--date",
        "2026-10-18",
    ])
    .unwrap();
    let Command::Annex(args) = cli.command else {
        panic!("expected annex");
    };

    let report = generate_document(&config, TemplateKind::Annex, &args).unwrap();
    assert!(report.docx.is_file());
    assert_eq!(report.record.first_name, "Charlie");
    assert!(report.missing.is_empty());
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let config = RepgenConfig::default();

    let init = |force| Command::Config {
        command: ConfigCommand::Init { force },
    };
    run(init(false), &config, Some(path.as_path())).unwrap();
    assert!(path.is_file());
    assert!(run(init(false), &config, Some(path.as_path())).is_err());
    run(init(true), &config, Some(path.as_path())).unwrap();
}
