use crate::{AssemblerSettings, ClusteringSettings, LoggingSettings, RawSettings};
use chrono_tz::Tz;
use color_eyre::eyre::{Report, bail, eyre};

/// Validated settings used by the timeline pipeline.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub timezone: Tz,
    pub clustering: ClusteringSettings,
    pub assembler: AssemblerSettings,
    pub logging: LoggingSettings,
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = Report;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let timezone = parse_timezone(&raw.timeline.timezone)?;

        let threshold = raw.clustering.threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            bail!("clustering.threshold must be a non-negative number, got {threshold}");
        }
        if raw.clustering.dimension == 0 {
            bail!("clustering.dimension must be positive");
        }
        if raw.clustering.batch_size == Some(0) {
            bail!("clustering.batch_size must be positive when set");
        }
        if raw.assembler.extraction_concurrency == 0 {
            bail!("assembler.extraction_concurrency must be positive");
        }

        Ok(Self {
            timezone,
            clustering: raw.clustering,
            assembler: raw.assembler,
            logging: raw.logging,
        })
    }
}

fn parse_timezone(tz_string: &str) -> Result<Tz, Report> {
    if tz_string.trim().is_empty() {
        return Ok(Tz::UTC);
    }
    tz_string
        .trim()
        .parse::<Tz>()
        .map_err(|_| eyre!("Invalid timezone: {tz_string}"))
}
