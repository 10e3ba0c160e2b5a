use app_state::load_settings_from_path;
use clap::Parser;
use color_eyre::Result;
use photo_timeline::assembler::TimelineAssembler;
use photo_timeline::clock::SystemClock;
use photo_timeline::collaborators::EmbeddingExtractor;
use std::path::PathBuf;
use std::sync::Arc;
use timeline::json_store::JsonPhotoStore;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Builds a chronological timeline with day events and face clusters from a JSON export.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file with a `photos` array of raw photo records.
    input: PathBuf,
    /// Where to write the timeline JSON. Defaults to stdout.
    #[clap(long, short)]
    output: Option<PathBuf>,
    #[clap(long, default_value = "config/settings.yaml")]
    config: PathBuf,
    #[clap(long, default_value = ".env")]
    env_file: PathBuf,
    #[clap(long, default_value = "default")]
    timeline_id: String,
    /// Skip face clustering even when the input has embeddings.
    #[clap(long, default_value_t = false, action)]
    no_faces: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let settings = load_settings_from_path(&args.config, Some(&args.env_file))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = JsonPhotoStore::open(&args.input, args.output.clone()).await?;
    let assembler = TimelineAssembler::from_settings(&settings, Arc::new(SystemClock))?;
    let extractor: Option<&dyn EmbeddingExtractor> =
        (!args.no_faces && store.has_embeddings()).then_some(&store as &dyn EmbeddingExtractor);

    let timeline = assembler.run(&args.timeline_id, &store, extractor).await?;
    info!(
        "Wrote {} events and {} estimated capture times",
        timeline.events.len(),
        timeline.estimated_count()
    );
    Ok(())
}
