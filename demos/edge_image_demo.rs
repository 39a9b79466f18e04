// demos/edge_image_demo.rs
// ------------------------------------------------------------
// File-to-file smoke run: load an image, run the edge pipeline,
// write the edge map back out.
// cargo run -p demos --bin edge_image_demo -- --input photo.jpg --output edges.png
// ------------------------------------------------------------
use anyhow::{Context, Result};
use clap::Parser;
use edgekit_ops::{EdgeThresholds, ImageProcOps, DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use edgekit_pipeline::{pack, FrameTransformer};
use image::RgbaImage;

#[derive(Parser)]
struct CliArgs {
    #[arg(long)]
    input: String,

    #[arg(long)]
    output: String,

    #[arg(long, default_value_t = DEFAULT_LOW_THRESHOLD)]
    low: f32,

    #[arg(long, default_value_t = DEFAULT_HIGH_THRESHOLD)]
    high: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let img = image::open(&args.input)
        .with_context(|| format!("reading {}", args.input))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    let pixels = pack::pack_argb(img.as_raw());

    let transformer =
        FrameTransformer::with_thresholds(ImageProcOps, EdgeThresholds::new(args.low, args.high));
    let edges = transformer.transform(&pixels, width, height)?;

    let out = RgbaImage::from_raw(width, height, pack::unpack_argb(&edges))
        .context("edge buffer did not match image dimensions")?;
    out.save(&args.output)
        .with_context(|| format!("writing {}", args.output))?;

    println!("{}x{} -> {}", width, height, args.output);
    Ok(())
}
