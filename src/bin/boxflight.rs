use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "boxflight", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Plan a camera flight and write the poses as JSON.
    Path(PathArgs),
    /// Plan a camera flight and render every pose as a PNG sequence.
    Fly(FlyArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input flight config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Worker thread count (defaults to all cores).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct PathArgs {
    /// Input flight config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output poses JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Override the configured frame count.
    #[arg(long)]
    frames: Option<usize>,
}

#[derive(Parser, Debug)]
struct FlyArgs {
    /// Input flight config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for the PNG sequence.
    #[arg(long)]
    out_dir: PathBuf,

    /// Override the configured frame count.
    #[arg(long)]
    frames: Option<usize>,

    /// Worker thread count (defaults to all cores).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Path(args) => cmd_path(args),
        Command::Fly(args) => cmd_fly(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<boxflight::FlightConfig> {
    let f = File::open(path).with_context(|| format!("open flight config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let cfg: boxflight::FlightConfig =
        serde_json::from_reader(r).with_context(|| "parse flight config JSON")?;
    cfg.validate()?;
    Ok(cfg)
}

fn save_png(frame: &boxflight::FrameBgr, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.to_rgb8(),
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.in_path)?;
    let scene = boxflight::Mandelbox::new(cfg.scene);
    let threading = boxflight::RenderThreading {
        threads: args.threads,
    };

    let frame = boxflight::render_frame_with(&scene, &cfg.camera, &cfg.render, &threading)?;
    save_png(&frame, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_path(args: PathArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.in_path)?;
    let scene = boxflight::Mandelbox::new(cfg.scene);
    let planner_cfg = boxflight::PlannerConfig {
        frames: args.frames.unwrap_or(cfg.planner.frames),
        ..cfg.planner
    };

    let poses = boxflight::plan_path(&scene, cfg.camera, &cfg.render, planner_cfg)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&poses).with_context(|| "serialize poses")?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write poses '{}'", args.out.display()))?;

    eprintln!("wrote {} poses to {}", poses.len(), args.out.display());
    Ok(())
}

fn cmd_fly(args: FlyArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.in_path)?;
    let scene = boxflight::Mandelbox::new(cfg.scene);
    let planner_cfg = boxflight::PlannerConfig {
        frames: args.frames.unwrap_or(cfg.planner.frames),
        ..cfg.planner
    };
    let threading = boxflight::RenderThreading {
        threads: args.threads,
    };

    let poses = boxflight::plan_path(&scene, cfg.camera, &cfg.render, planner_cfg)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let out_dir = args.out_dir.clone();
    boxflight::render_flight(&scene, &poses, &cfg.render, &threading, |idx, frame| {
        let path = out_dir.join(format!("frame_{idx:05}.png"));
        save_png(&frame, &path)
            .map_err(boxflight::FlightError::Other)
    })?;

    eprintln!(
        "wrote {} frames to {}",
        poses.len(),
        args.out_dir.display()
    );
    Ok(())
}
