use std::fs;
use std::process::Command;

use tempfile::tempdir;

#[test]
fn renders_particle_trace_as_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("trace.json");

    let status = Command::new(env!("CARGO_BIN_EXE_backdrop"))
        .args([
            "render",
            "--kind",
            "particles",
            "--frames",
            "30",
            "--pointer",
            "400,300",
            "--output",
            output.to_str().unwrap(),
        ])
        .status()
        .expect("Failed to execute backdrop");

    assert!(status.success(), "backdrop exited with error");

    let trace: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("Failed to read trace"))
            .expect("Trace is not JSON");

    assert_eq!(trace["kind"], "particles");
    assert_eq!(trace["population"], 200);
    assert_eq!(trace["frames"], 30);

    let ops = trace["ops"].as_array().expect("ops array");
    assert_eq!(ops[0]["op"], "clear");
    let fills = ops.iter().filter(|op| op["op"] == "fill_circle").count();
    assert_eq!(fills, 200, "every particle is drawn");
}

#[test]
fn renders_rings_as_svg() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("rings.svg");

    let status = Command::new(env!("CARGO_BIN_EXE_backdrop"))
        .args([
            "render",
            "--kind",
            "contact",
            "--frames",
            "5",
            "--pointer",
            "100,100",
            "--format",
            "svg",
            "--output",
            output.to_str().unwrap(),
        ])
        .status()
        .expect("Failed to execute backdrop");

    assert!(status.success(), "backdrop exited with error");

    let svg = fs::read_to_string(&output).expect("Failed to read svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"width="800" height="600""#));
    assert_eq!(svg.matches(r#"fill="none""#).count(), 5, "one ring per pointer sample");
}

#[test]
fn render_applies_tuning_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let tuning = dir.path().join("tuning.yaml");
    fs::write(&tuning, "orbits:\n  mobile:\n    hubs: 3\n").expect("Failed to write tuning");

    let out = Command::new(env!("CARGO_BIN_EXE_backdrop"))
        .args([
            "render",
            "--kind",
            "orbits",
            "--mobile",
            "--frames",
            "2",
            "--tuning",
            tuning.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute backdrop");

    assert!(out.status.success(), "backdrop exited with error");
    let trace: serde_json::Value = serde_json::from_slice(&out.stdout).expect("stdout is JSON");
    assert_eq!(trace["class"], "mobile");
    assert_eq!(trace["population"], 3);
}

#[test]
fn rejects_invalid_tuning() {
    let dir = tempdir().expect("Failed to create temp dir");
    let tuning = dir.path().join("tuning.yaml");
    fs::write(&tuning, "particles:\n  desktop:\n    friction: 1.5\n").expect("Failed to write");

    let out = Command::new(env!("CARGO_BIN_EXE_backdrop"))
        .args(["tuning", "--tuning", tuning.to_str().unwrap()])
        .output()
        .expect("Failed to execute backdrop");

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("particles.desktop.friction"), "stderr: {stderr}");
}

#[test]
fn prints_effective_tuning() {
    let out = Command::new(env!("CARGO_BIN_EXE_backdrop"))
        .arg("tuning")
        .output()
        .expect("Failed to execute backdrop");

    assert!(out.status.success());
    let yaml = String::from_utf8_lossy(&out.stdout);
    assert!(yaml.contains("particles:"));
    assert!(yaml.contains("particle_count: 200"));
    assert!(yaml.contains("max_rings: 40"));
}
