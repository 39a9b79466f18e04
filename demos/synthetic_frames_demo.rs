//! Synthetic frame-loop demo
//!
//! Stands in for a live camera feed: generates frames with a square
//! sliding across a dark background, pushes each through the edge
//! pipeline, and reports rolling FPS stats.
//!
//! Usage: cargo run -p demos --bin synthetic_frames_demo

use std::collections::VecDeque;
use std::time::Instant;

use anyhow::Result;
use edgekit_ops::ImageProcOps;
use edgekit_pipeline::{ready_message, FrameTransformer};

// Demo configuration constants
const FRAME_WIDTH: u32 = 320;
const FRAME_HEIGHT: u32 = 240;
const FRAME_COUNT: usize = 90;
const FPS_WINDOW_SIZE: usize = 30;

/// FPS calculation helper
fn calculate_fps(window: &VecDeque<Instant>) -> f64 {
    if window.len() < 2 {
        return 0.0;
    }
    let duration = window
        .back()
        .unwrap()
        .duration_since(*window.front().unwrap());
    (window.len() - 1) as f64 / duration.as_secs_f64()
}

/// Dark frame with a bright square whose position depends on `step`.
fn synthetic_frame(width: u32, height: u32, step: usize) -> Vec<u32> {
    let mut pixels = vec![0xff10_1010u32; (width * height) as usize];
    let side = height / 4;
    let x0 = (step as u32 * 4) % (width - side);
    let y0 = height / 2 - side / 2;
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            pixels[(y * width + x) as usize] = 0xffe8_e8e8;
        }
    }
    pixels
}

fn main() -> Result<()> {
    env_logger::init();

    println!("🚀 EdgeKit Synthetic Frame Demo");
    println!("===============================");
    println!("{}", ready_message());

    let transformer = FrameTransformer::new(ImageProcOps);
    println!("{}", transformer.run_self_test());
    println!();

    let mut fps_times: VecDeque<Instant> = VecDeque::with_capacity(FPS_WINDOW_SIZE);

    for step in 0..FRAME_COUNT {
        let frame = synthetic_frame(FRAME_WIDTH, FRAME_HEIGHT, step);
        let edges = transformer.transform(&frame, FRAME_WIDTH, FRAME_HEIGHT)?;
        let edge_pixels = edges.iter().filter(|&&px| px & 0x00ff_ffff != 0).count();

        fps_times.push_back(Instant::now());
        if fps_times.len() > FPS_WINDOW_SIZE {
            fps_times.pop_front();
        }

        if (step + 1) % 30 == 0 {
            println!(
                "{}x{} | frame {:>3} | {:>5.1} FPS | {} edge pixels | Canny Edge Detection",
                FRAME_WIDTH,
                FRAME_HEIGHT,
                step + 1,
                calculate_fps(&fps_times),
                edge_pixels
            );
        }
    }

    println!("\n✅ processed {FRAME_COUNT} frames");
    Ok(())
}
