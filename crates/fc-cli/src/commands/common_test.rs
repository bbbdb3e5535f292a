use super::*;
use std::fs;
use tempfile::tempdir;

fn global_for(dir: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: dir.to_path_buf(),
        config: None,
        database: None,
    }
}

#[test]
fn test_defaults_without_config_file() {
    let temp_dir = tempdir().unwrap();
    let deployment = load_deployment(&global_for(temp_dir.path())).unwrap();

    assert!(deployment.config_path.is_none());
    assert_eq!(deployment.config.database.path, "data/forecourt.db");
    assert_eq!(
        deployment.database_path(),
        Some(temp_dir.path().join("data/forecourt.db"))
    );
    assert!(!deployment.config.name.is_empty());
}

#[test]
fn test_config_file_and_database_override() {
    let temp_dir = tempdir().unwrap();
    fs::write(
        temp_dir.path().join("forecourt.yml"),
        "name: harbor\ndatabase:\n  path: db/harbor.db\n",
    )
    .unwrap();

    let mut global = global_for(temp_dir.path());
    let deployment = load_deployment(&global).unwrap();
    assert_eq!(deployment.config.name, "harbor");
    assert_eq!(
        deployment.config_path,
        Some(temp_dir.path().join("forecourt.yml"))
    );
    assert_eq!(
        deployment.database_path(),
        Some(temp_dir.path().join("db/harbor.db"))
    );

    global.database = Some(":memory:".to_string());
    let deployment = load_deployment(&global).unwrap();
    assert_eq!(deployment.config.name, "harbor");
    assert_eq!(deployment.database_path(), None);
    assert_eq!(deployment.database_display(), ":memory:");
}

#[test]
fn test_explicit_config_must_exist() {
    let temp_dir = tempdir().unwrap();
    let mut global = global_for(temp_dir.path());
    global.config = Some(temp_dir.path().join("missing.yml"));
    assert!(load_deployment(&global).is_err());
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_dir = tempdir().unwrap();
    fs::write(
        temp_dir.path().join("forecourt.yml"),
        "name: harbor\ndatabase:\n  path: x.db\n  busy_timeout_ms: 0\n",
    )
    .unwrap();
    assert!(load_deployment(&global_for(temp_dir.path())).is_err());
}

#[test]
fn test_open_existing_store_requires_file() {
    let temp_dir = tempdir().unwrap();
    let deployment = load_deployment(&global_for(temp_dir.path())).unwrap();
    let err = deployment.open_existing_store().unwrap_err();
    assert!(err.to_string().contains("forecourt init"));
    assert!(!temp_dir.path().join("data/forecourt.db").exists());
}

#[test]
fn test_calculate_column_widths() {
    let rows = vec![
        vec!["vehicles".to_string(), "3".to_string()],
        vec!["schema_migrations".to_string(), "12".to_string()],
    ];
    assert_eq!(calculate_column_widths(&["TABLE", "ROWS"], &rows), [17, 4]);
}

#[test]
fn test_format_bytes() {
    assert_eq!(format_bytes(512), "512 B");
    assert_eq!(format_bytes(4096), "4.0 KiB");
    assert_eq!(format_bytes(3 * 1024 * 1024 + 512 * 1024), "3.5 MiB");
}
