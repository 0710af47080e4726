//! End-to-end CLI tests driving `run` with parsed arguments.

use clap::Parser as _;
use tempfile::TempDir;

use bimsplit_cli::Args;

const MODEL: &str = "\
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCAXIS2PLACEMENT3D(#1,$,$);
#3=IFCLOCALPLACEMENT($,#2);
#100=IFCWALL('2O2Fr$t4X7Zf8NOew3F100',$,'Basic Wall',$,$,#3,$,$);
#101=IFCPIPESEGMENT('2O2Fr$t4X7Zf8NOew3F101',$,'Hot Water Pipe',$,$,#3,$,$);
ENDSEC;
END-ISO-10303-21;
";

#[test]
fn splits_a_model_into_the_output_directory() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("model.ifc");
    std::fs::write(&input, MODEL).unwrap();
    let out = dir.path().join("split");

    let args = Args::parse_from([
        "bimsplit",
        input.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
    ]);
    bimsplit_cli::run(&args).unwrap();

    assert!(out.join("walls.glb").exists());
    assert!(out.join("pipes.glb").exists());
    assert!(out.join("walls.json").exists());
    assert!(out.join("statistics.json").exists());
}

#[test]
fn custom_config_changes_the_taxonomy() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("model.ifc");
    std::fs::write(&input, MODEL).unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
[rules]
fallback = "misc"
structural = []

[[rules.keywords]]
category = "plumbing"
keywords = ["pipe", "water"]
"#,
    )
    .unwrap();
    let out = dir.path().join("split");

    let args = Args::parse_from([
        "bimsplit",
        input.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
    ]);
    bimsplit_cli::run(&args).unwrap();

    assert!(out.join("plumbing.glb").exists());
    // The wall matches no rule anymore and lands in the fallback bucket.
    assert!(out.join("misc.glb").exists());
    assert!(!out.join("walls.glb").exists());
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let args = Args::parse_from([
        "bimsplit",
        dir.path().join("absent.ifc").to_str().unwrap(),
        "--output-dir",
        dir.path().join("out").to_str().unwrap(),
    ]);
    assert!(bimsplit_cli::run(&args).is_err());
}
