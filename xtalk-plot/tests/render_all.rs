use tempfile::tempdir;
use xtalk_core::{
    AccumulatorSet, CellCoord, Classification, CrosstalkMapBuilder, DetectorGrid, DetectorSpan,
    EventRecord, HistogramConfig, PlanePosition, NEIGHBOR_COUNT,
};
use xtalk_plot::{HistogramPlot, ImageFormat, Renderer};

fn filled_accumulators() -> AccumulatorSet {
    let grid = DetectorGrid::new(2, DetectorSpan::default()).unwrap();
    let mut acc = AccumulatorSet::new(grid, HistogramConfig::default()).unwrap();
    for (k, cell) in grid.cells().enumerate() {
        let class = Classification {
            cell,
            valid_for_map: true,
            valid_for_pooled: k % 2 == 0,
        };
        let event = EventRecord {
            center_ly: 100 + 10 * i32::try_from(k).unwrap(),
            neighbor_ly: [3; NEIGHBOR_COUNT],
            neighbor_ly_optical: [2; NEIGHBOR_COUNT],
            center_time: 2.0,
            neighbor_time: [3.5; NEIGHBOR_COUNT],
            entry: PlanePosition::new(-25.0, -25.0, -5.0),
            exit: PlanePosition::new(-25.0, -25.0, 5.0),
            gun: [-25.0, -25.0],
            ..EventRecord::default()
        };
        acc.accumulate(&class, &event);
    }
    acc
}

#[test]
fn test_render_all_svg() {
    let dir = tempdir().unwrap();
    let acc = filled_accumulators();
    let maps = CrosstalkMapBuilder::build(&acc);

    let renderer = Renderer::new(dir.path().join("plots"), ImageFormat::Svg);
    let written = renderer.render_all(&acc, &maps).unwrap();

    // Nine images per neighbor plus five run-wide ones.
    assert_eq!(written.len(), 9 * NEIGHBOR_COUNT + 5);
    for stem in [
        "light_yield_0",
        "light_yield_delta_3",
        "light_yield_cherenkov_5",
        "light_yield_optical_7",
        "crosstalk_1",
        "scatter_2",
        "time_4",
        "time_diff_6",
        "crosstalk_map_0",
        "hit_map",
        "gun_x",
        "gun_y",
        "center_light_yield",
        "center_time",
    ] {
        let path = dir.path().join("plots").join(format!("{stem}.svg"));
        assert!(written.contains(&path), "missing {stem}");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }
}

#[test]
fn test_render_png() {
    let dir = tempdir().unwrap();
    let acc = filled_accumulators();
    let maps = CrosstalkMapBuilder::build(&acc);
    let renderer = Renderer::new(dir.path(), ImageFormat::Png).with_size(320, 240);

    let path = renderer
        .render(
            "center_light_yield",
            &HistogramPlot {
                title: "Center".to_string(),
                x_desc: "Light yield [p.e.]",
                hist: acc.center_light_yield(),
            },
        )
        .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");

    let grid = xtalk_plot::GridPlot::from_map("map".to_string(), &maps[0]);
    assert!(grid.cells.iter().any(|&(c, v)| c == CellCoord::new(0, 0) && v.is_finite()));
    let path = renderer.render("crosstalk_map_0", &grid).unwrap();
    assert!(path.exists());
}
