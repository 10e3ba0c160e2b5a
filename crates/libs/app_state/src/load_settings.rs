use crate::{AppSettings, RawSettings};
use color_eyre::eyre::Result;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.yaml";

/// Loads settings from `config/settings.yaml` in the working directory, with `.env`
/// and `APP__*` environment variables layered on top.
pub fn load_app_settings() -> Result<AppSettings> {
    load_settings_from_path(Path::new(DEFAULT_SETTINGS_PATH), Some(Path::new(".env")))
}

pub fn load_settings_from_path(settings_file: &Path, env_file: Option<&Path>) -> Result<AppSettings> {
    if let Some(env_file) = env_file {
        // Missing .env is fine, real environment variables still apply.
        dotenv::from_path(env_file).ok();
    }
    let config_path = settings_file.canonicalize()?;
    debug!("Loading settings from {}", config_path.display());

    let builder = with_defaults(Config::builder())?
        .add_source(File::from(config_path))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    AppSettings::try_from(raw_settings)
}

/// Parses settings from a YAML document, without consulting the environment.
pub fn settings_from_yaml(yaml: &str) -> Result<AppSettings> {
    let raw_settings = with_defaults(Config::builder())?
        .add_source(File::from_str(yaml, FileFormat::Yaml))
        .build()?
        .try_deserialize::<RawSettings>()?;
    AppSettings::try_from(raw_settings)
}

fn with_defaults(builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>> {
    Ok(builder
        .set_default("timeline.timezone", "")?
        .set_default("clustering.threshold", 0.6)?
        .set_default("clustering.dimension", 128)?
        .set_default("assembler.extraction_concurrency", 4)?
        .set_default("logging.level", "info")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    #[test]
    fn defaults_fill_missing_sections() -> Result<()> {
        let settings = settings_from_yaml("logging:\n  level: debug\n")?;
        assert_eq!(settings.timezone, Tz::UTC);
        assert!((settings.clustering.threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(settings.clustering.dimension, 128);
        assert_eq!(settings.clustering.batch_size, None);
        assert_eq!(settings.assembler.extraction_concurrency, 4);
        assert_eq!(settings.logging.level, "debug");
        Ok(())
    }

    #[test]
    fn reads_timezone_and_batching() -> Result<()> {
        let yaml = "timeline:\n  timezone: Europe/Amsterdam\nclustering:\n  threshold: 0.5\n  batch_size: 64\n";
        let settings = settings_from_yaml(yaml)?;
        assert_eq!(settings.timezone, Tz::Europe__Amsterdam);
        assert_eq!(settings.clustering.batch_size, Some(64));
        Ok(())
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(settings_from_yaml("timeline:\n  timezone: Mars/Olympus\n").is_err());
        assert!(settings_from_yaml("clustering:\n  threshold: -1.0\n").is_err());
        assert!(settings_from_yaml("clustering:\n  batch_size: 0\n").is_err());
    }

    #[test]
    fn loads_repository_settings_file() -> Result<()> {
        let settings_file = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../config/settings.yaml");
        let settings = load_settings_from_path(&settings_file, None)?;
        assert_eq!(settings.clustering.dimension, 128);
        Ok(())
    }
}
