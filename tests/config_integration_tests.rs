//! Integration tests for ConfigManager and settings file handling
//!
//! These tests verify:
//! - Settings loading and saving
//! - Default settings generation on first run
//! - The on-disk YAML layout, including the nested exception list
//! - Environment overrides of the general settings
//! - Settings reloads picked up by the next run

use camino::Utf8PathBuf;
use folder_extractor::metrics::Metrics;
use folder_extractor::models::ExceptionRule;
use folder_extractor::services::{FileHistory, RecordingNotifier, ScanPipeline, ScanRunner};
use folder_extractor::{
    ConfigManager, GeneralSettings, MediaType, MediaTypeConfig, ScanCoordinator, ScanTrigger,
    StateManager,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

fn manager(config_path: &Utf8PathBuf) -> ConfigManager {
    ConfigManager::new(config_path)
        .unwrap()
        .with_environment(config::Map::new())
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = manager(&config_path);

    assert_eq!(manager.config_dir(), &config_path);
}

#[test]
fn test_config_directory_creation() {
    let (_temp_dir, root) = create_test_config_dir();
    let config_path = root.join("Settings");

    assert!(!config_path.exists());
    let _manager = ConfigManager::new(&config_path).unwrap();
    assert!(config_path.exists());
}

#[test]
fn test_first_run_writes_all_settings_files() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = manager(&config_path);

    manager.ensure_defaults().unwrap();

    for name in ["General.yaml", "Anime.yaml", "Series.yaml", "Movie.yaml"] {
        assert!(config_path.join(name).exists(), "{} missing", name);
    }

    let settings = manager.load_settings().unwrap();
    assert_eq!(settings.general, GeneralSettings::default());
    assert_eq!(settings.types.len(), 3);
    assert!(settings.types.iter().all(|t| t.exceptions.is_empty()));
}

#[test]
fn test_hand_written_type_settings() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = manager(&config_path);

    fs::write(
        config_path.join("Anime.yaml"),
        r#"Type: Anime
ExtractionPath: /downloads/anime
CompletionPath: /library/anime
UseSeriesFolder: true
UseCurrentlyWatchingCheck: true
Exceptions:
  - Name: OnePiece
    Path: \Anime\OnePiece
  - Name: One
    Path: \Other
"#,
    )
    .unwrap();

    let config = manager.load_type_settings(MediaType::Anime).unwrap();

    assert_eq!(config.extraction_path, Utf8PathBuf::from("/downloads/anime"));
    assert!(config.use_series_folder);
    assert!(!config.use_season_folder);
    assert!(config.use_currently_watching_check);
    assert_eq!(config.currently_watching_marker, "[Watching]");
    assert_eq!(
        config.exceptions,
        vec![
            ExceptionRule::new("OnePiece", "\\Anime\\OnePiece"),
            ExceptionRule::new("One", "\\Other"),
        ]
    );
}

#[test]
fn test_partial_general_settings_fill_defaults() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = manager(&config_path);

    fs::write(
        config_path.join("General.yaml"),
        "use_history: false\ntimer_interval_minutes: 10\n",
    )
    .unwrap();

    let general = manager.load_general_settings().unwrap();
    assert!(!general.use_history);
    assert_eq!(general.timer_interval_minutes, 10);
    assert!(general.use_file_moving);
    assert!(general.use_popup_notification);
}

#[test]
fn test_environment_overrides_general_settings() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let mut vars = config::Map::new();
    vars.insert("EXTRACTOR_USE_CLEANUP".to_string(), "false".to_string());
    let manager = ConfigManager::new(&config_path)
        .unwrap()
        .with_environment(vars);

    manager.ensure_defaults().unwrap();

    assert!(!manager.load_general_settings().unwrap().use_cleanup);
}

#[test]
fn test_invalid_yaml_handling() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = manager(&config_path);

    fs::write(config_path.join("Series.yaml"), "invalid: yaml: content: {{").unwrap();

    assert!(manager.load_type_settings(MediaType::Series).is_err());
    assert!(manager.load_settings().is_err());
}

#[test]
fn test_settings_reloaded_at_every_run() {
    let (temp_dir, config_path) = create_test_config_dir();
    let root = config_path.clone();
    let settings_dir = root.join("Settings");
    let extraction = root.join("in");
    let completion = root.join("out");
    fs::create_dir_all(&extraction).unwrap();
    fs::create_dir_all(&completion).unwrap();
    fs::write(extraction.join("Film 1080p.mkv"), b"film").unwrap();

    let config_manager = manager(&settings_dir);
    config_manager.ensure_defaults().unwrap();

    let metrics = Arc::new(Metrics::new());
    let pipeline = ScanPipeline::new(
        Arc::new(FileHistory::new(root.join("History.txt"))),
        Arc::new(RecordingNotifier::new()),
        Arc::clone(&metrics),
    );
    let runner = ScanRunner::new(
        Arc::new(ScanCoordinator::new()),
        config_manager.clone(),
        pipeline,
        StateManager::new(),
        metrics,
    );

    // Movie folders not configured yet
    let first = runner.run(ScanTrigger::Manual);
    assert!(first.reports()[2].is_aborted());

    config_manager
        .save_type_settings(&MediaTypeConfig::with_paths(
            MediaType::Movie,
            &extraction,
            &completion,
        ))
        .unwrap();

    let second = runner.run(ScanTrigger::Manual);
    let movie = &second.reports()[2];
    assert_eq!(movie.media_type, MediaType::Movie);
    assert!(!movie.is_aborted());
    assert!(completion.join("Film.mkv").exists());

    drop(temp_dir);
}

#[test]
fn test_concurrent_config_access() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = Arc::new(manager(&config_path));
    manager.ensure_defaults().unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let manager_clone = Arc::clone(&manager);
            std::thread::spawn(move || {
                let _settings = manager_clone.load_settings().unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
