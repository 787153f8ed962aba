//! Pose Dump
//!
//! Loads a skinned scene description, samples its first animation and prints
//! one skinning matrix per bound bone.
//!
//! ```text
//! pose_dump <scene.json> [seconds] [--settings settings.json] [--json]
//! ```
//!
//! Run with `RUST_LOG=debug` to see import details.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use glam::Mat4;
use myth_pose::{AnimationClip, Avatar, Settings, SkinnedScene};

struct Args {
    scene: PathBuf,
    seconds: f32,
    settings: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut scene = None;
    let mut seconds = 0.0;
    let mut settings = None;
    let mut json = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--settings" => {
                let path = args.next().context("--settings needs a path")?;
                settings = Some(PathBuf::from(path));
            }
            _ if scene.is_none() => scene = Some(PathBuf::from(arg)),
            _ => {
                seconds = arg
                    .parse()
                    .with_context(|| format!("'{arg}' is not a time in seconds"))?;
            }
        }
    }

    let Some(scene) = scene else {
        bail!("usage: pose_dump <scene.json> [seconds] [--settings settings.json] [--json]");
    };

    Ok(Args {
        scene,
        seconds,
        settings,
        json,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = parse_args()?;

    let settings = match &args.settings {
        Some(path) => Settings::from_json_file(path)
            .with_context(|| format!("reading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let text = std::fs::read_to_string(&args.scene)
        .with_context(|| format!("reading scene from {}", args.scene.display()))?;
    let scene = SkinnedScene::from_json_str(&text)?;

    let mut avatar = Avatar::from_scene(&scene, 0, settings.pose)?;

    let matrices: Vec<Mat4> = if scene.animations.is_empty() {
        log::info!("Scene has no animations; evaluating the bind pose");
        avatar.calculate_bind_pose().to_vec()
    } else {
        let clip = Arc::new(AnimationClip::from_scene(&scene, 0, &settings.import)?);
        log::info!(
            "Sampling '{}' ({:.2}s) at {:.3}s",
            clip.name,
            clip.duration_seconds(),
            args.seconds
        );
        avatar.calculate_pose(args.seconds, &clip).to_vec()
    };

    let names: Vec<&str> = avatar.bindings().names().collect();

    if args.json {
        let bones: Vec<serde_json::Value> = names
            .iter()
            .zip(&matrices)
            .map(|(name, m)| serde_json::json!({ "name": name, "matrix": m.to_cols_array() }))
            .collect();
        let doc = serde_json::json!({ "time": args.seconds, "bones": bones });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    for (slot, (name, m)) in names.iter().zip(&matrices).enumerate() {
        println!("[{slot}] {name}");
        // Print row by row for readability
        for row in m.transpose().to_cols_array_2d() {
            println!(
                "    {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                row[0], row[1], row[2], row[3]
            );
        }
    }

    Ok(())
}
