use std::fs;
use std::process::Command;

use marketmap::LayoutSnapshot;

fn marketmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_marketmap"))
}

#[test]
fn writes_snapshot_json_to_stdout() {
    let output = marketmap()
        .args(["layout", "--input", "tests/fixtures/market.json"])
        .output()
        .expect("Failed to execute marketmap");

    assert!(output.status.success(), "marketmap exited with error");

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(json["nodes"].as_array().unwrap().len(), 8);
    // The link to the missing company is dropped
    assert_eq!(json["links"].as_array().unwrap().len(), 9);
    assert_eq!(json["view"]["scale"], 1.0);
}

#[test]
fn writes_svg_file() {
    let dir = tempfile::tempdir().unwrap();
    let svg_path = dir.path().join("map.svg");

    let status = marketmap()
        .args([
            "layout",
            "--input",
            "tests/fixtures/market.yaml",
            "--output",
            svg_path.to_str().unwrap(),
            "--width",
            "1024",
            "--height",
            "768",
        ])
        .status()
        .expect("Failed to execute marketmap");

    assert!(status.success(), "marketmap exited with error");

    let svg = fs::read_to_string(&svg_path).expect("Failed to read map.svg");
    assert!(svg.contains(r#"width="1024""#));
    assert!(svg.contains("Acme Robotics"));
    assert!(svg.contains("Seed Fund I"));
}

#[test]
fn same_seed_gives_identical_files() {
    let dir = tempfile::tempdir().unwrap();
    let run = |name: &str| {
        let path = dir.path().join(name);
        let status = marketmap()
            .args([
                "layout",
                "-i",
                "tests/fixtures/market.json",
                "-o",
                path.to_str().unwrap(),
                "--seed",
                "11",
            ])
            .status()
            .expect("Failed to execute marketmap");
        assert!(status.success());
        fs::read_to_string(path).unwrap()
    };

    assert_eq!(run("first.json"), run("second.json"));
}

#[test]
fn config_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");

    let status = marketmap()
        .args([
            "layout",
            "-i",
            "tests/fixtures/market.json",
            "-o",
            path.to_str().unwrap(),
            "--config",
            "tests/fixtures/layout.yaml",
        ])
        .status()
        .expect("Failed to execute marketmap");
    assert!(status.success());

    let snapshot: LayoutSnapshot =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    for (i, a) in snapshot.nodes.iter().enumerate() {
        for b in &snapshot.nodes[i + 1..] {
            assert!((a.x - b.x).hypot(a.y - b.y) >= a.radius + b.radius - 1e-6);
        }
    }
}

#[test]
fn empty_graph_yields_empty_snapshot() {
    let output = marketmap()
        .args(["layout", "--input", "tests/fixtures/empty.json"])
        .output()
        .expect("Failed to execute marketmap");

    assert!(output.status.success());
    let snapshot: LayoutSnapshot = serde_json::from_slice(&output.stdout).unwrap();
    assert!(snapshot.nodes.is_empty());
    assert!(snapshot.links.is_empty());
}

#[test]
fn inspect_reports_dropped_links() {
    let output = marketmap()
        .args(["inspect", "--input", "tests/fixtures/market.json"])
        .output()
        .expect("Failed to execute marketmap");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("nodes: 8"));
    assert!(stdout.contains("  Company: 4"));
    assert!(stdout.contains("  competitor: 1"));
    assert!(stdout.contains("dropped links: 1"));
}

#[test]
fn unsupported_output_format_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.png");

    let output = marketmap()
        .args([
            "layout",
            "-i",
            "tests/fixtures/market.json",
            "-o",
            path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute marketmap");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unsupported format: png"));
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.yaml");
    fs::write(&config, "view:\n  minScale: 5\n  maxScale: 1\n").unwrap();

    let status = marketmap()
        .args([
            "layout",
            "-i",
            "tests/fixtures/market.json",
            "--config",
            config.to_str().unwrap(),
        ])
        .status()
        .expect("Failed to execute marketmap");

    assert!(!status.success());
}
