use std::env;

use anyhow::{anyhow, Context, Result};
use log::info;

use scene_ingest::{build_group, Model, Scene};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let scene = Scene::load(&options.path)
        .with_context(|| format!("failed to load scene {}", options.path))?;

    println!(
        "Loaded scene with {} placements ({} models, {} spotlights, {} pointlights)",
        scene.placements().len(),
        scene.models().len(),
        scene.spotlights().len(),
        scene.pointlights().len()
    );
    if let Some(sun) = scene.sunlight() {
        println!(
            "Sunlight dir=({:.2}, {:.2}, {:.2}) color=({:.2}, {:.2}, {:.2}) ambient={:.2}",
            sun.direction.x,
            sun.direction.y,
            sun.direction.z,
            sun.color.x,
            sun.color.y,
            sun.color.z,
            sun.ambient
        );
    }
    for model in scene.models().models() {
        print_model(model);
    }
    for placement in scene.placements() {
        let model = scene
            .model(placement.model)
            .ok_or_else(|| anyhow!("placement refers to a model that was never loaded"))?;
        println!(
            " - {} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            model.name(),
            placement.position.x,
            placement.position.y,
            placement.position.z,
            placement.scale.x,
            placement.scale.y,
            placement.scale.z
        );
    }
    Ok(())
}

fn print_model(model: &Model) {
    let (batches, vertices) = model
        .groups()
        .iter()
        .flat_map(|group| build_group(model, group))
        .fold((0, 0), |(batches, vertices), batch| {
            (batches + 1, vertices + batch.vertices.len())
        });
    info!("built {batches} mesh batches for {}", model.name());
    println!(
        "Model {}: {} groups, {} triangles, {} materials, {} textures, {} vertices",
        model.name(),
        model.groups().len(),
        model.triangle_count(),
        model.materials().materials().len(),
        model.textures().len(),
        vertices
    );
}

struct CliOptions {
    path: String,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!("Usage: scene-ingest <scene file>"));
        };
        if let Some(extra) = args.next() {
            return Err(anyhow!(
                "Unexpected argument: {extra}. Usage: scene-ingest <scene file>"
            ));
        }
        Ok(Self { path })
    }
}
