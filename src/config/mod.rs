use crate::models::{GeneralSettings, MediaType, MediaTypeConfig, Settings};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Prefix for environment overrides of the general settings, e.g. `EXTRACTOR_USE_TIMER=false`
pub const ENV_PREFIX: &str = "EXTRACTOR";

/// Configuration manager for loading and saving YAML settings files.
///
/// Manages four files in the settings directory:
/// - `General.yaml`: feature toggles shared by every media type
/// - `Anime.yaml`, `Series.yaml`, `Movie.yaml`: folders and exceptions per media type
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    general_settings_path: Utf8PathBuf,
    environment: Option<config::Map<String, String>>,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified settings directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing settings files (e.g., "Settings")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create settings directory: {}", config_dir))?;
        }

        Ok(Self {
            general_settings_path: config_dir.join("General.yaml"),
            config_dir,
            environment: None,
        })
    }

    /// Read environment overrides from `vars` instead of the process environment
    pub fn with_environment(mut self, vars: config::Map<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    pub fn general_settings_path(&self) -> &Utf8Path {
        &self.general_settings_path
    }

    pub fn type_settings_path(&self, media_type: MediaType) -> Utf8PathBuf {
        self.config_dir.join(format!("{}.yaml", media_type))
    }

    /// Write every settings file that does not exist yet with default values.
    ///
    /// Existing files are left alone.
    pub fn ensure_defaults(&self) -> Result<()> {
        if !self.general_settings_path.exists() {
            tracing::info!(
                "Creating default general settings at {}",
                self.general_settings_path
            );
            self.save_general_settings(&GeneralSettings::default())?;
        }

        for media_type in MediaType::ALL {
            let path = self.type_settings_path(media_type);
            if !path.exists() {
                tracing::info!("Creating default {} settings at {}", media_type, path);
                self.save_type_settings(&MediaTypeConfig::new(media_type))?;
            }
        }

        Ok(())
    }

    /// Load the general settings.
    ///
    /// `General.yaml` is layered under `EXTRACTOR_*` environment variables. A
    /// missing file yields the defaults.
    pub fn load_general_settings(&self) -> Result<GeneralSettings> {
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(self.environment.clone());

        let settings: GeneralSettings = config::Config::builder()
            .add_source(
                config::File::new(self.general_settings_path.as_str(), config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(environment)
            .build()
            .with_context(|| {
                format!(
                    "Failed to read general settings: {}",
                    self.general_settings_path
                )
            })?
            .try_deserialize()
            .with_context(|| {
                format!(
                    "Failed to parse general settings: {}",
                    self.general_settings_path
                )
            })?;

        tracing::debug!("Loaded general settings from {}", self.general_settings_path);
        Ok(settings)
    }

    /// Save the general settings.
    pub fn save_general_settings(&self, settings: &GeneralSettings) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(settings)
            .context("Failed to serialize general settings to YAML")?;

        fs::write(&self.general_settings_path, yaml_string).with_context(|| {
            format!(
                "Failed to write general settings: {}",
                self.general_settings_path
            )
        })?;

        tracing::info!("Saved general settings to {}", self.general_settings_path);
        Ok(())
    }

    /// Load the settings of one media type.
    ///
    /// # Returns
    /// The stored settings, or empty settings if the file doesn't exist
    pub fn load_type_settings(&self, media_type: MediaType) -> Result<MediaTypeConfig> {
        let path = self.type_settings_path(media_type);
        if !path.exists() {
            tracing::warn!("{} settings not found at {}, using defaults", media_type, path);
            return Ok(MediaTypeConfig::new(media_type));
        }

        let file_contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {} settings: {}", media_type, path))?;

        let mut config: MediaTypeConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse {} settings: {}", media_type, path))?;

        if config.media_type != media_type {
            tracing::warn!(
                "{} declares Type '{}', treating it as {}",
                path,
                config.media_type,
                media_type
            );
            config.media_type = media_type;
        }

        tracing::debug!("Loaded {} settings from {}", media_type, path);
        Ok(config)
    }

    /// Save the settings of one media type to `<Type>.yaml`.
    pub fn save_type_settings(&self, config: &MediaTypeConfig) -> Result<()> {
        let path = self.type_settings_path(config.media_type);
        let yaml_string = serde_yaml_ng::to_string(config).with_context(|| {
            format!("Failed to serialize {} settings to YAML", config.media_type)
        })?;

        fs::write(&path, yaml_string)
            .with_context(|| format!("Failed to write {} settings: {}", config.media_type, path))?;

        tracing::info!("Saved {} settings to {}", config.media_type, path);
        Ok(())
    }

    /// Load the general settings and every media type in scan order.
    pub fn load_settings(&self) -> Result<Settings> {
        let general = self.load_general_settings()?;
        let types = MediaType::ALL
            .into_iter()
            .map(|media_type| self.load_type_settings(media_type))
            .collect::<Result<Vec<_>>>()?;

        Ok(Settings { general, types })
    }

    /// Get the settings directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExceptionRule;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path)
            .unwrap()
            .with_environment(config::Map::new());
        (manager, temp_dir)
    }

    #[test]
    fn test_create_config_manager_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(root.join("Settings")).unwrap();

        assert!(manager.config_dir().is_dir());
        assert_eq!(manager.type_settings_path(MediaType::Anime), root.join("Settings/Anime.yaml"));
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();

        assert_eq!(manager.load_general_settings().unwrap(), GeneralSettings::default());
        assert_eq!(
            manager.load_type_settings(MediaType::Movie).unwrap(),
            MediaTypeConfig::new(MediaType::Movie)
        );
    }

    #[test]
    fn test_load_save_general_settings() {
        let (manager, _temp_dir) = create_test_config_manager();

        let settings = GeneralSettings {
            use_cleanup: false,
            timer_interval_minutes: 15,
            ..GeneralSettings::default()
        };
        manager.save_general_settings(&settings).unwrap();

        assert_eq!(manager.load_general_settings().unwrap(), settings);
    }

    #[test]
    fn test_environment_overrides_file() {
        let (manager, _temp_dir) = create_test_config_manager();
        manager.save_general_settings(&GeneralSettings::default()).unwrap();

        let mut vars = config::Map::new();
        vars.insert("EXTRACTOR_USE_TIMER".to_string(), "false".to_string());
        vars.insert("EXTRACTOR_TIMER_INTERVAL_MINUTES".to_string(), "30".to_string());
        let manager = manager.with_environment(vars);

        let settings = manager.load_general_settings().unwrap();
        assert!(!settings.use_timer);
        assert_eq!(settings.timer_interval_minutes, 30);
        assert!(settings.use_file_moving);
    }

    #[test]
    fn test_load_save_type_settings_with_exceptions() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = MediaTypeConfig::with_paths(MediaType::Series, "/in", "/out");
        config.use_season_folder = true;
        config.exceptions = vec![
            ExceptionRule::new("Show", "/TV/Show"),
            ExceptionRule::new("Other", "Other"),
        ];
        manager.save_type_settings(&config).unwrap();

        let yaml = fs::read_to_string(manager.type_settings_path(MediaType::Series)).unwrap();
        assert!(yaml.contains("Exceptions:"));
        assert!(yaml.contains("Name: Show"));

        assert_eq!(manager.load_type_settings(MediaType::Series).unwrap(), config);
    }

    #[test]
    fn test_type_field_follows_file_name() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(
            manager.type_settings_path(MediaType::Anime),
            "Type: Movie\nExtractionPath: /in\nCompletionPath: /out\n",
        )
        .unwrap();

        let config = manager.load_type_settings(MediaType::Anime).unwrap();
        assert_eq!(config.media_type, MediaType::Anime);
        assert_eq!(config.extraction_path, Utf8PathBuf::from("/in"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.type_settings_path(MediaType::Movie), "Type: [").unwrap();

        assert!(manager.load_type_settings(MediaType::Movie).is_err());
    }

    #[test]
    fn test_ensure_defaults_keeps_existing_files() {
        let (manager, _temp_dir) = create_test_config_manager();
        let custom = MediaTypeConfig::with_paths(MediaType::Anime, "/a", "/b");
        manager.save_type_settings(&custom).unwrap();

        manager.ensure_defaults().unwrap();

        assert!(manager.general_settings_path().exists());
        assert!(manager.type_settings_path(MediaType::Movie).exists());
        assert_eq!(manager.load_type_settings(MediaType::Anime).unwrap(), custom);
    }

    #[test]
    fn test_load_settings_in_scan_order() {
        let (manager, _temp_dir) = create_test_config_manager();
        manager.ensure_defaults().unwrap();

        let settings = manager.load_settings().unwrap();
        let order: Vec<MediaType> = settings.types.iter().map(|t| t.media_type).collect();
        assert_eq!(order, MediaType::ALL.to_vec());
    }
}
