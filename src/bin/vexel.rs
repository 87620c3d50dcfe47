use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vexel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import an SVG/SVGZ file as a vector `.scn` scene.
    Svg(SvgArgs),
    /// Rasterize an SVG/SVGZ file to a PNG.
    Rasterize(RasterizeArgs),
}

#[derive(Parser, Debug)]
struct SvgArgs {
    /// Input SVG/SVGZ path.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Save path; the importer appends `.scn`.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RasterizeArgs {
    /// Input SVG/SVGZ path.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output width in pixels; defaults to the document width.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels; defaults to the document height.
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Svg(args) => cmd_svg(args),
        Command::Rasterize(args) => cmd_rasterize(args),
    }
}

fn cmd_svg(args: SvgArgs) -> anyhow::Result<()> {
    let out = vexel::import_svg_scene(&args.in_path, &args.out)
        .with_context(|| format!("import svg '{}'", args.in_path.display()))?;
    for file in &out.generated_files {
        eprintln!("wrote {}", file.display());
    }
    Ok(())
}

fn cmd_rasterize(args: RasterizeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read svg '{}'", args.in_path.display()))?;
    let tree = vexel::svg::parse_svg(&bytes)?;

    let width = args.width.unwrap_or_else(|| tree.size().width().ceil() as u32).max(1);
    let height = args
        .height
        .unwrap_or_else(|| tree.size().height().ceil() as u32)
        .max(1);
    let pixels = vexel::svg::rasterize_svg(&tree, width, height)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &pixels,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
