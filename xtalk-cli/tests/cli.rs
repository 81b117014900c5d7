use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn xtalk() -> Command {
    Command::new(env!("CARGO_BIN_EXE_xtalk"))
}

fn write_cell(dir: &Path, x: u32, y: u32) {
    let cx = -25.0 + 50.0 * f64::from(x);
    let cy = -25.0 + 50.0 * f64::from(y);
    let mut file = File::create(dir.join(format!("root_X{x}_Y{y}.jsonl"))).unwrap();
    writeln!(
        file,
        r#"{{"center_ly":50,"neighbor_ly":[5,1,0,2,2,0,1,0],"center_time":1.0,"neighbor_time":[2.0,0,0,0,0,0,0,0],"entry":[{cx},{cy},-5.0],"exit":[{cx},{cy},5.0],"gun":[{cx},{cy}]}}"#
    )
    .unwrap();
}

#[test]
fn test_point_run_writes_outputs() {
    let input = tempdir().unwrap();
    for (x, y) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        write_cell(input.path(), x, y);
    }
    let out = tempdir().unwrap();

    let status = xtalk()
        .arg(input.path())
        .args(["--mode", "point", "--format", "svg", "--output"])
        .arg(out.path())
        .status()
        .unwrap();
    assert!(status.success());

    assert!(out.path().join("crosstalk_maps.csv").exists());
    assert!(out.path().join("crosstalk_map_0.svg").exists());
    assert!(out.path().join("hit_map.svg").exists());

    let summary: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.path().join("summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["grid_side"], 2);
    assert_eq!(summary["events_pooled"], 4);
}

#[test]
fn test_no_plots_writes_summaries_only() {
    let input = tempdir().unwrap();
    write_cell(input.path(), 0, 0);
    let out = tempdir().unwrap();

    let status = xtalk()
        .arg(input.path())
        .args(["--mode", "point", "--no-plots", "--output"])
        .arg(out.path())
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out.path().join("summary.json").exists());
    assert!(!out.path().join("hit_map.png").exists());
}

#[test]
fn test_usage_errors_exit_2() {
    let input = tempdir().unwrap();
    for mode in ["beam", "plane"] {
        let output = xtalk()
            .arg(input.path())
            .args(["--mode", mode])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(2), "--mode {mode}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("--grid"), "{stderr}");
        assert!(stderr.contains("Usage"), "{stderr}");
    }

    let status = xtalk()
        .arg(input.path())
        .args(["--mode", "diagonal"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
}

#[test]
fn test_runtime_errors_exit_1() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();

    // Empty input directory.
    let status = xtalk()
        .arg(input.path())
        .args(["--mode", "point", "--output"])
        .arg(out.path())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));

    // Three files cannot form a square grid.
    for (x, y) in [(0, 0), (0, 1), (1, 0)] {
        write_cell(input.path(), x, y);
    }
    let status = xtalk()
        .arg(input.path())
        .args(["--mode", "point", "--output"])
        .arg(out.path())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
    assert!(!out.path().join("summary.json").exists());
}
