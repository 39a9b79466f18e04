use edgekit_ops::{EdgeThresholds, ImageProcOps};
use edgekit_pipeline::{ready_message, FrameTransformer};

const W: u32 = 64;
const H: u32 = 48;

// Left half dark, right half bright: one strong vertical edge.
fn step_frame(width: u32, height: u32) -> Vec<u32> {
    (0..height)
        .flat_map(|_| {
            (0..width).map(move |x| {
                if x < width / 2 {
                    0xff20_2020
                } else {
                    0xffe0_e0e0
                }
            })
        })
        .collect()
}

#[test]
fn output_matches_input_dimensions() {
    let frame = step_frame(W, H);
    let out = FrameTransformer::new(ImageProcOps)
        .transform(&frame, W, H)
        .unwrap();
    assert_eq!(out.len(), (W * H) as usize);
}

#[test]
fn output_alpha_is_fully_opaque() {
    let frame = step_frame(W, H);
    let out = FrameTransformer::new(ImageProcOps)
        .transform(&frame, W, H)
        .unwrap();
    assert!(out.iter().all(|px| px >> 24 == 0xff));
}

#[test]
fn edges_come_out_gray() {
    let frame = step_frame(W, H);
    let out = FrameTransformer::new(ImageProcOps)
        .transform(&frame, W, H)
        .unwrap();
    for px in out {
        let r = (px >> 16) & 0xff;
        let g = (px >> 8) & 0xff;
        let b = px & 0xff;
        assert_eq!(r, g);
        assert_eq!(g, b);
    }
}

#[test]
fn step_edge_shows_up_in_the_output() {
    let frame = step_frame(W, H);
    let out = FrameTransformer::new(ImageProcOps)
        .transform(&frame, W, H)
        .unwrap();
    let lit = out.iter().filter(|&&px| px & 0x00ff_ffff != 0).count();
    assert!(lit > 0, "expected some edge pixels");
    assert!(lit < out.len(), "expected mostly background");
}

#[test]
fn input_is_left_bit_identical() -> anyhow::Result<()> {
    let frame = step_frame(W, H);
    let before = frame.clone();

    let transformer = FrameTransformer::new(ImageProcOps);
    transformer.transform(&frame, W, H)?;
    assert_eq!(frame, before);

    // failure path reads nothing back either
    assert!(transformer.transform(&frame, W + 1, H).is_err());
    assert_eq!(frame, before);
    Ok(())
}

#[test]
fn looser_thresholds_find_at_least_as_many_edges() {
    let frame = step_frame(W, H);
    let lit = |low, high| {
        FrameTransformer::with_thresholds(ImageProcOps, EdgeThresholds::new(low, high))
            .transform(&frame, W, H)
            .unwrap()
            .iter()
            .filter(|&&px| px & 0x00ff_ffff != 0)
            .count()
    };
    assert!(lit(10.0, 30.0) >= lit(100.0, 200.0));
}

#[test]
fn process_frame_collapses_to_option() {
    let frame = step_frame(W, H);
    let transformer = FrameTransformer::new(ImageProcOps);
    assert!(transformer.process_frame(&frame, W, H).is_some());
    assert!(transformer.process_frame(&frame, 0, H).is_none());
}

#[test]
fn self_test_reports_canvas_dimensions() {
    let report = FrameTransformer::new(ImageProcOps).run_self_test();
    assert!(report.contains("480x640"), "got: {report}");
    assert!(report.contains("passed"), "got: {report}");
}

#[test]
fn self_test_is_deterministic() {
    let transformer = FrameTransformer::new(ImageProcOps);
    assert_eq!(transformer.run_self_test(), transformer.run_self_test());
}

#[test]
fn ready_message_identifies_the_module() {
    assert_eq!(ready_message(), "Edge Detection Ready!");
}
