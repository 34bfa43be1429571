//! Mesh Viewer
//!
//! Opens a window showing an OBJ model. Click a part to select it, then
//! press H to hide it or U to bring every part back.
//!
//! ```text
//! mesh_viewer [MODEL] [--config viewer.json] [--log-level debug]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use meshview_io::ModelSource;
use meshview_viewer::{InteractiveViewer, ViewerConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mesh_viewer", about = "Interactive OBJ mesh viewer")]
struct Args {
    /// Model to open at startup
    model: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = match &args.config {
        Some(path) => ViewerConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    let mut app = InteractiveViewer::new(config).context("creating viewer")?;
    if let Some(model) = args.model {
        info!(path = %model.display(), "opening model");
        app.open(ModelSource::Path(model));
    }

    println!("Controls:");
    println!("  Left click: select part    Left drag: orbit");
    println!("  Right drag: pan            Wheel: zoom");
    println!("  H: hide/unhide selected    U: unhide all");
    println!("  R: reset camera            +/-: zoom in/out");
    println!("  O: open file (or drop one on the window)");
    println!("  Esc: quit");

    app.run().context("running viewer")?;
    Ok(())
}
