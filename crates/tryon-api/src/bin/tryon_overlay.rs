//! Composite a local photo with its pose skeleton and the garment sprite.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tryon_media::{
    encode_png, Compositor, FixedPoseProvider, MediaError, OverlaySession, PoseProvider,
    RemotePoseProvider,
};
use tryon_ml_client::LandmarkClient;
use tryon_models::{LandmarkSet, PoseOptions};

#[derive(Parser, Debug)]
#[command(name = "tryon-overlay", version, about = "Draw a garment over a photo using pose landmarks")]
struct Args {
    /// Photo to composite
    #[arg(long)]
    image: PathBuf,

    /// Landmark JSON file (bare array or {"landmarks": [...]}); takes
    /// precedence over the landmark service
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// HTTP landmark service
    #[arg(long, env = "LANDMARK_SERVICE_URL")]
    landmark_url: Option<String>,

    /// Landmark service timeout in seconds
    #[arg(long, default_value_t = 30)]
    landmark_timeout: u64,

    /// Garment sprite
    #[arg(long, default_value = "assets/tshirt.png")]
    garment: PathBuf,

    /// Output PNG
    #[arg(long)]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tryon=info".parse()?))
        .init();

    let args = Args::parse();
    let provider = pose_provider(&args)?;

    let compositor = match Compositor::load_garment(&args.garment) {
        Ok(sprite) => Compositor::default().with_garment(sprite),
        Err(MediaError::AssetNotFound(path)) => {
            warn!(path = %path.display(), "Garment sprite not found; drawing skeleton only");
            Compositor::default()
        }
        Err(e) => return Err(e).context("Failed to load garment sprite"),
    };

    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;

    let session = OverlaySession::new(Arc::new(compositor), provider, PoseOptions::default());
    let generation = session.submit(bytes);
    let frame = session
        .wait_for(generation)
        .await
        .with_context(|| format!("Failed to composite {}", args.image.display()))?;

    if let Some(reason) = &frame.detection_error {
        warn!(error = %reason, "No landmarks; output is the photo alone");
    }

    let png = encode_png(&frame.image)?;
    tokio::fs::write(&args.out, png)
        .await
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    info!(
        out = %args.out.display(),
        landmarks = frame.landmarks.iter().count(),
        garment_drawn = frame.garment_drawn,
        placement = ?frame.placement,
        "Overlay written"
    );
    Ok(())
}

fn pose_provider(args: &Args) -> anyhow::Result<Arc<dyn PoseProvider>> {
    if let Some(path) = &args.landmarks {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        let landmarks = LandmarkSet::from_json(&value)?;
        return Ok(Arc::new(FixedPoseProvider::new(landmarks)));
    }

    if let Some(url) = &args.landmark_url {
        let client = LandmarkClient::new(url.clone(), Duration::from_secs(args.landmark_timeout))?;
        return Ok(Arc::new(RemotePoseProvider::new(client)));
    }

    bail!("either --landmarks or --landmark-url (LANDMARK_SERVICE_URL) is required")
}
