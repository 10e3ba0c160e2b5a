use serde::Deserialize;

/// Settings exactly as they appear in `config/settings.yaml` and the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub timeline: RawTimelineSettings,
    pub clustering: ClusteringSettings,
    pub assembler: AssemblerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawTimelineSettings {
    /// IANA timezone name used for local wall-clock time. Empty means UTC.
    pub timezone: String,
}

/// Face clustering configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ClusteringSettings {
    /// Maximum Euclidean distance at which a face joins an existing cluster.
    pub threshold: f32,
    /// Expected length of every embedding vector.
    pub dimension: usize,
    /// When set, faces are clustered in batches of this size and merged afterwards.
    pub batch_size: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssemblerSettings {
    /// How many embedding extractions may be in flight at once.
    pub extraction_concurrency: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}
