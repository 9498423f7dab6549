use repgen_cli::config::{RepgenConfig, load_config, load_config_from, migrate, save_config};

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let config = load_config(Some(path.as_path())).unwrap();
    assert_eq!(config, RepgenConfig::default());
    assert_eq!(config.export.timeout_secs, 120);
    let reference = config.report.distributions.data_dir.unwrap();
    assert!(reference.ends_with("reference"));
    assert_eq!(config.report.distributions.models.len(), 4);
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = RepgenConfig::default();
    config.database = dir.path().join("patients.db");
    config.report.required_figures.report = vec![1, 2];
    config.export.timeout_secs = 30;
    save_config(&config, &path).unwrap();

    assert!(!dir.path().join("nested").join("config.json.tmp").exists());
    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded, config);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn unversioned_config_is_read_as_first_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"database": "/data/patients.db", "templates_dir": "/data/templates", "export": {"timeout_secs": 45}}"#,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.config_version, 1);
    assert_eq!(config.database, std::path::PathBuf::from("/data/patients.db"));
    assert_eq!(config.export.timeout_secs, 45);
    assert_eq!(config.report.required_figures.report, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn stamping_leaves_other_fields_untouched() {
    let json = serde_json::json!({"templates_dir": "/t", "out_dir": null});
    let migrated = migrate(json, 0).unwrap();
    assert_eq!(
        migrated,
        serde_json::json!({"templates_dir": "/t", "out_dir": null, "config_version": 1})
    );
}

#[test]
fn newer_config_is_rejected() {
    let err = migrate(serde_json::json!({"config_version": 99}), 99).unwrap_err();
    assert!(err.to_string().contains("newer than this build"));
}

#[test]
fn non_object_config_is_rejected() {
    assert!(migrate(serde_json::json!([1, 2]), 0).is_err());
}
