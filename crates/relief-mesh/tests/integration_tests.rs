//! End-to-end tests for relief-mesh.
//!
//! These exercise the whole chain from raster -> distance fields -> fillet ->
//! mesh -> ASCII STL, plus the session wrapper.

use hashbrown::HashMap;
use image::{ImageFormat, Rgba, RgbaImage};
use relief_mesh::{
    Grid, MeshHeights, ReliefParams, ReliefPipeline, ReliefSession, ReliefSink, SessionState,
    StlFileSink,
};
use std::io::Cursor;

/// 4x4 zeros with the centre 2x2 block at 200.
fn centre_block() -> Grid {
    block(4, 4, 1, 2, 1, 2, 200.0)
}

fn block(width: u32, height: u32, x0: u32, x1: u32, y0: u32, y1: u32, value: f64) -> Grid {
    Grid::from_fn(width, height, |x, y| {
        if (x0..=x1).contains(&x) && (y0..=y1).contains(&y) {
            value
        } else {
            0.0
        }
    })
    .unwrap()
}

/// Grayscale disk on black, as a painted heightmap would look.
fn disk_image(size: u32, radius: f64) -> RgbaImage {
    let c = f64::from(size) / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = f64::from(x) + 0.5 - c;
        let dy = f64::from(y) + 0.5 - c;
        let v = if (dx * dx + dy * dy).sqrt() <= radius { 180 } else { 0 };
        Rgba([v, v, v, 255])
    })
}

#[test]
fn test_centre_block_scenario() {
    let output = ReliefPipeline::new(centre_block()).run().unwrap();

    // Edge field: zero on the border, positive inside.
    for y in 0..4 {
        for x in 0..4 {
            let d = output.edge_distance.get(x, y);
            if x == 0 || y == 0 || x == 3 || y == 3 {
                assert_eq!(d, 0.0, "border ({x}, {y})");
            } else {
                assert!(d > 0.0, "interior ({x}, {y})");
            }
        }
    }

    // At least one ridge seed inside the block.
    let seeds = (1..=2)
        .flat_map(|y| (1..=2).map(move |x| (x, y)))
        .filter(|&(x, y)| output.skeleton_distance.get(x, y) == 0.0)
        .count();
    assert!(seeds >= 1);

    // Non-empty mesh sitting around the centre.
    assert!(!output.is_empty());
    for tri in &output.mesh.triangles {
        for v in &tri.vertices {
            assert!(v.x.abs() <= 2.0 && v.y.abs() <= 2.0);
            assert!(v.z >= 0.0);
        }
    }
}

#[test]
fn test_all_zero_scenario() {
    let output = ReliefPipeline::new(Grid::zeros(6, 6).unwrap()).run().unwrap();
    assert!(output.edge_distance.cells().iter().all(|&d| d == 0.0));
    assert!(output.is_empty());
    assert!(output.flat_coords().is_empty());
    assert_eq!(output.stats.ridge_cells, 0);
    assert_eq!(output.export_stl().unwrap(), "solid relief\nendsolid relief\n");

    let mut session = ReliefSession::default();
    session.load(Grid::zeros(6, 6).unwrap());
    session.recompute().unwrap();
    assert_eq!(session.export_stl().unwrap(), None);
}

#[test]
fn test_export_counts_and_offsets() {
    let output = ReliefPipeline::new(block(10, 8, 2, 7, 2, 5, 255.0))
        .side_walls(true)
        .run()
        .unwrap();
    let k = output.mesh.triangle_count();
    assert_eq!(output.flat_coords().len(), 9 * k);

    let stl = output.export_stl().unwrap();
    let facets = stl.lines().filter(|l| l.trim_start().starts_with("facet")).count();
    let vertices: Vec<&str> = stl
        .lines()
        .filter(|l| l.trim_start().starts_with("vertex"))
        .collect();
    assert_eq!(facets, k);
    assert_eq!(vertices.len(), 3 * k);
    for line in vertices {
        for value in line.split_whitespace().skip(1) {
            let v: f64 = value.parse().unwrap();
            assert!(v >= 0.0, "negative coordinate in {line:?}");
        }
    }
}

#[test]
fn test_determinism() {
    let raw = block(12, 9, 2, 9, 1, 6, 140.0);
    let a = ReliefPipeline::new(raw.clone()).side_walls(true).run().unwrap();
    let b = ReliefPipeline::new(raw).side_walls(true).run().unwrap();
    assert_eq!(a.export_stl().unwrap(), b.export_stl().unwrap());
    assert_eq!(a.fillet.heights, b.fillet.heights);
}

#[test]
fn test_side_walls_close_rectangle() {
    let output = ReliefPipeline::new(block(9, 7, 2, 6, 2, 4, 255.0))
        .with_params(ReliefParams::for_printing())
        .run()
        .unwrap();

    let key = |p: &nalgebra::Point3<f64>| (p.x.to_bits(), p.y.to_bits(), p.z.to_bits());
    let mut uses = HashMap::new();
    for tri in &output.mesh.triangles {
        for k in 0..3 {
            let a = key(&tri.vertices[k]);
            let b = key(&tri.vertices[(k + 1) % 3]);
            *uses.entry((a.min(b), a.max(b))).or_insert(0usize) += 1;
        }
    }
    assert!(uses.values().all(|&n| n == 2));
}

#[test]
fn test_png_to_stl_file() {
    let dir = tempfile::tempdir().unwrap();
    let png_path = dir.path().join("disk.png");
    disk_image(24, 8.0)
        .save_with_format(&png_path, ImageFormat::Png)
        .unwrap();

    let output = ReliefPipeline::from_source(png_path.as_path(), ReliefParams::default())
        .unwrap()
        .solid_name("disk")
        .run()
        .unwrap();
    assert!(output.stats.ridge_cells > 0);
    assert!(output.stats.max_fillet_height > 0.0);

    let stl_path = dir.path().join("disk.stl");
    let mut sink = StlFileSink::new(&stl_path);
    sink.consume(&output).unwrap();
    assert_eq!(sink.facets_written, output.mesh.triangle_count());

    let text = std::fs::read_to_string(&stl_path).unwrap();
    assert!(text.starts_with("solid disk\n"));
    assert!(text.ends_with("endsolid disk\n"));

    let parsed = stl_io::read_stl(&mut Cursor::new(text.into_bytes())).unwrap();
    assert_eq!(parsed.faces.len(), output.mesh.triangle_count());
}

#[test]
fn test_quantized_matches_preview_red_channel() {
    let output = ReliefPipeline::new(block(8, 8, 1, 6, 1, 6, 255.0))
        .mesh_heights(MeshHeights::Quantized)
        .run()
        .unwrap();
    let preview = output.preview();

    // Top triangles come first in each top/floor pair; their vertex heights
    // are red channel values of the preview at the matching cell.
    for pair in output.mesh.triangles.chunks(2) {
        for v in &pair[0].vertices {
            let x = (v.x + 4.0) as u32;
            let y = (4.0 - v.y) as u32;
            assert_eq!(v.z, f64::from(preview.get_pixel(x, y)[0]));
        }
    }
}

#[test]
fn test_session_round_trip_from_png_bytes() {
    let mut bytes = Cursor::new(Vec::new());
    disk_image(16, 5.0)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    let image = image::load_from_memory(bytes.get_ref()).unwrap();

    let mut session = ReliefSession::new(ReliefParams::for_printing());
    session.load_source(&image).unwrap();
    assert_eq!(session.state(), SessionState::Loaded);

    let ticket = session.begin_recompute().unwrap();
    let worker = std::thread::spawn(move || ticket.run());
    let computed = worker.join().unwrap();
    assert!(session.complete(computed).unwrap());

    let stl = session.export_stl().unwrap().unwrap();
    assert!(stl.contains("facet normal 0 0 0"));
}
