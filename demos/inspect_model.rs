//! Inspect Model
//!
//! Loads an OBJ file without opening a window, fits the camera to it and
//! reports the framing and which part sits under the center of the view.

use anyhow::{Context, Result};
use clap::Parser;
use meshview_core::Bounded;
use meshview_viewer::{LoadOutcome, Viewer, ViewerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inspect_model", about = "Print camera framing and parts of an OBJ model")]
struct Args {
    model: PathBuf,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let model = meshview_io::read_model(&args.model)
        .with_context(|| format!("reading {}", args.model.display()))?;

    let mut viewer = Viewer::new(ViewerConfig::default());
    viewer.resize(args.width, args.height);
    let fit = match viewer.set_model(model) {
        LoadOutcome::Applied(fit) => fit,
        other => anyhow::bail!("model was not applied: {:?}", other),
    };

    let model = viewer.model().context("model missing after load")?;
    println!("Model: {}", model.name());
    println!("  {} vertices, {} faces", model.vertex_count(), model.face_count());
    for node in model.traverse().filter(|n| n.has_geometry()) {
        let mesh_faces = node.mesh.as_ref().map_or(0, |m| m.face_count());
        println!("  part {} {:?}: {} faces", node.id(), node.name, mesh_faces);
    }

    if let Some(fit) = fit {
        println!("Camera:");
        println!("  original center {:?}", fit.center);
        println!("  size            {:?}", fit.size);
        println!("  distance        {:.4}", fit.final_distance);
        println!("  near / far      {:.5} / {:.3}", fit.near, fit.far);
        println!("  recentered box  {:?}", model.bounding_box().center());
    }

    let (cx, cy) = (args.width as f32 / 2.0, args.height as f32 / 2.0);
    match viewer.click(cx, cy) {
        Some(id) => {
            let name = viewer
                .model()
                .and_then(|m| m.node(id))
                .map(|n| n.name.clone())
                .unwrap_or_default();
            println!("Under the view center: part {} {:?}", id, name);
        }
        None => println!("Nothing under the view center"),
    }
    Ok(())
}
