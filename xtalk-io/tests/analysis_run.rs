use approx::assert_relative_eq;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;
use xtalk_core::{CellCoord, EventRecord, NeighborChannel, PlanePosition, SubComponent};
use xtalk_io::{
    write_summaries, AddressMode, AnalysisConfig, AnalysisRun, Error, MAPS_CSV, SUMMARY_JSON,
};

fn write_events(dir: &Path, name: &str, events: &[EventRecord]) {
    let mut file = File::create(dir.join(name)).unwrap();
    for event in events {
        writeln!(file, "{}", serde_json::to_string(event).unwrap()).unwrap();
    }
}

// Default span is -50..50 mm; on a 2x2 grid cell centers sit at -25 and 25.
fn event_at(x: f64, y: f64, center: i32, upper_left: i32) -> EventRecord {
    let mut event = EventRecord {
        center_ly: center,
        entry: PlanePosition::new(x, y, -5.0),
        exit: PlanePosition::new(x, y, 5.0),
        gun: [x, y],
        ..EventRecord::default()
    };
    event.neighbor_ly[0] = upper_left;
    event
}

fn cell_center(cell: CellCoord) -> (f64, f64) {
    (
        -25.0 + 50.0 * f64::from(cell.x),
        -25.0 + 50.0 * f64::from(cell.y),
    )
}

#[test]
fn test_point_mode_run() {
    let dir = tempdir().unwrap();
    for (x, y) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        let (cx, cy) = cell_center(CellCoord::new(x, y));
        let mut central = event_at(cx, cy, 10, 2);
        central.neighbor_ly_optical[0] = 1;
        // Enters near the cell edge: per-cell only.
        let edge = event_at(cx + 20.0, cy, 10, 4);
        write_events(
            dir.path(),
            &format!("root_X{x}_Y{y}.jsonl"),
            &[central, edge],
        );
    }
    File::create(dir.path().join("README.txt")).unwrap();

    let output = AnalysisRun::execute(&AnalysisConfig::new(dir.path())).unwrap();
    let summary = &output.summary;
    assert_eq!(summary.files, 4);
    assert_eq!(summary.grid_side, 2);
    assert_eq!(summary.events_read, 8);
    assert_eq!(summary.events_accumulated, 8);
    assert_eq!(summary.events_pooled, 4);
    assert_eq!(summary.rejected.total(), 0);

    let upper_left = &summary.channels[0];
    assert_eq!(upper_left.channel, "upper_left");
    assert_eq!(upper_left.entries, 4);
    assert_relative_eq!(upper_left.mean_ratio, 0.2);
    assert_relative_eq!(upper_left.scatter_slope, 0.2);

    let acc = &output.accumulators;
    assert_eq!(acc.hit_map().values(), &[2, 2, 2, 2]);
    let optical = acc
        .channel(NeighborChannel::UpperLeft)
        .sub_component(SubComponent::Optical);
    assert_eq!(optical.entries(), 4);
    // Sentinel -1 never reaches the sub-component histograms.
    assert_eq!(
        acc.channel(NeighborChannel::Upper)
            .sub_component(SubComponent::Optical)
            .entries(),
        0
    );

    // Per-cell mean of 0.2 and 0.4.
    for map_bin in [(1, 1), (1, 2), (2, 1), (2, 2)] {
        assert_relative_eq!(
            output.maps[0].bin(map_bin.0, map_bin.1).unwrap(),
            30.0,
            epsilon = 1e-9
        );
    }

    let out = dir.path().join("out");
    write_summaries(&out, &output.maps, &output.summary).unwrap();
    let csv = std::fs::read_to_string(out.join(MAPS_CSV)).unwrap();
    assert_eq!(csv.lines().count(), 1 + 8 * 4);
    assert!(out.join(SUMMARY_JSON).exists());
}

#[test]
fn test_beam_mode_counts_rejections() {
    let dir = tempdir().unwrap();
    let mismatch = {
        let mut e = event_at(-25.0, -25.0, 10, 1);
        e.exit.x = 25.0;
        e
    };
    let no_hit = {
        let mut e = event_at(-25.0, -25.0, 10, 1);
        e.exit.z = 0.0;
        e
    };
    let outside = event_at(60.0, 0.0, 10, 1);
    let good = event_at(25.0, 25.0, 0, 1);
    write_events(dir.path(), "beam_a.jsonl", &[mismatch, no_hit]);
    write_events(dir.path(), "beam_b.jsonl", &[outside, good]);

    let config = AnalysisConfig::new(dir.path())
        .with_mode(AddressMode::Beam)
        .with_grid_side(2);
    let output = AnalysisRun::execute(&config).unwrap();
    let summary = &output.summary;
    assert_eq!(summary.events_read, 4);
    assert_eq!(summary.events_accumulated, 1);
    assert_eq!(summary.rejected.no_hit, 1);
    assert_eq!(summary.rejected.out_of_bounds, 1);
    assert_eq!(summary.rejected.cell_mismatch, 1);

    // Zero center yield: counted, no ratio.
    assert_eq!(output.accumulators.hit_map().values(), &[0, 0, 0, 1]);
    assert_eq!(summary.channels[0].entries, 0);
    assert!(summary.channels[0].mean_ratio.is_nan());
    assert!(output.maps[0].bin(2, 2).unwrap().is_nan());
}

#[test]
fn test_empty_input_is_error() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("root_X0_Y0.h5")).unwrap();
    let err = AnalysisRun::execute(&AnalysisConfig::new(dir.path())).unwrap_err();
    assert!(matches!(err, Error::EmptyInput { .. }));
}

#[test]
fn test_non_square_file_count_is_error() {
    let dir = tempdir().unwrap();
    for name in ["root_X0_Y0.jsonl", "root_X0_Y1.jsonl", "root_X1_Y0.jsonl"] {
        write_events(dir.path(), name, &[]);
    }
    let err = AnalysisRun::execute(&AnalysisConfig::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        Error::CoreError(xtalk_core::Error::DegenerateGrid(3))
    ));
}

#[test]
fn test_bad_file_name_aborts() {
    let dir = tempdir().unwrap();
    write_events(dir.path(), "cube_run.jsonl", &[EventRecord::default()]);
    let err = AnalysisRun::execute(&AnalysisConfig::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        Error::CoreError(xtalk_core::Error::InvalidFileName(_))
    ));
}

#[test]
fn test_stray_backup_file_aborts() {
    let dir = tempdir().unwrap();
    for name in [
        "root_X0_Y0.jsonl",
        "root_X0_Y0.jsonl.bak",
        "root_X0_Y1.jsonl",
        "root_X1_Y0.jsonl",
    ] {
        write_events(dir.path(), name, &[EventRecord::default()]);
    }
    let err = AnalysisRun::execute(&AnalysisConfig::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        Error::CoreError(xtalk_core::Error::InvalidFileName(ref name)) if name == "root_X0_Y0.jsonl.bak"
    ));
}

#[test]
fn test_duplicate_cell_aborts() {
    let dir = tempdir().unwrap();
    for name in [
        "root_X0_Y0.jsonl",
        "root_X00_Y0.jsonl",
        "root_X0_Y1.jsonl",
        "root_X1_Y0.jsonl",
    ] {
        write_events(dir.path(), name, &[EventRecord::default()]);
    }
    let err = AnalysisRun::execute(&AnalysisConfig::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        Error::CoreError(xtalk_core::Error::DuplicateCell { x: 0, y: 0 })
    ));
}

#[test]
fn test_cell_off_grid_aborts() {
    let dir = tempdir().unwrap();
    write_events(dir.path(), "root_X1_Y0.jsonl", &[EventRecord::default()]);
    let err = AnalysisRun::execute(&AnalysisConfig::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        Error::CoreError(xtalk_core::Error::InvalidCoordinate { x: 1, y: 0, side: 1 })
    ));
}

#[test]
fn test_malformed_event_aborts() {
    let dir = tempdir().unwrap();
    let mut file = File::create(dir.path().join("root_X0_Y0.jsonl")).unwrap();
    writeln!(file, "not json").unwrap();
    let err = AnalysisRun::execute(&AnalysisConfig::new(dir.path())).unwrap_err();
    assert!(matches!(err, Error::MalformedEvent { record: 1, .. }));
}
