//! End-to-end pipeline tests: STEP source in, category files out.

use std::fs;

use tempfile::TempDir;

use bimsplit::{Splitter, config::AppConfig};

/// A small mixed-discipline model: a wall, a pipe run, a duct run and a
/// space (which must be excluded).
const MODEL: &str = "\
ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''),'2;1');
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCAXIS2PLACEMENT3D(#1,$,$);
#3=IFCLOCALPLACEMENT($,#2);
#4=IFCCARTESIANPOINT((10.,0.,3.));
#5=IFCAXIS2PLACEMENT3D(#4,$,$);
#6=IFCLOCALPLACEMENT(#3,#5);
#100=IFCWALL('2O2Fr$t4X7Zf8NOew3F100',$,'Basic Wall',$,$,#3,$,$);
#101=IFCPIPESEGMENT('2O2Fr$t4X7Zf8NOew3F101',$,'Cold Water Pipe',$,$,#6,$,$);
#102=IFCDUCTSEGMENT('2O2Fr$t4X7Zf8NOew3F102',$,'Supply Duct',$,$,#6,$,$);
#103=IFCSPACE('2O2Fr$t4X7Zf8NOew3F103',$,'Room 101',$,$,#3,$,$);
ENDSEC;
END-ISO-10303-21;
";

fn run_model(source: &str) -> (TempDir, bimsplit::export::ExportSummary) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("model.ifc");
    fs::write(&input, source).unwrap();
    let out = dir.path().join("out");

    let splitter = Splitter::new(AppConfig::default());
    let summary = splitter.run(&input, &out).unwrap();
    (dir, summary)
}

#[test]
fn produces_one_glb_and_manifest_per_category() {
    let (dir, summary) = run_model(MODEL);
    let out = dir.path().join("out");

    let mut exported: Vec<String> = summary
        .exported()
        .iter()
        .map(|(category, _)| category.as_string())
        .collect();
    exported.sort();
    assert_eq!(exported, vec!["ducts", "pipes", "walls"]);

    for category in ["walls", "pipes", "ducts"] {
        assert!(out.join(format!("{category}.glb")).exists(), "{category}.glb");
        assert!(out.join(format!("{category}.json")).exists(), "{category}.json");
    }
    // The space is excluded, so no others bucket materializes.
    assert!(!out.join("others.glb").exists());
}

#[test]
fn exported_glbs_are_valid_containers() {
    let (dir, _) = run_model(MODEL);
    let bytes = fs::read(dir.path().join("out/pipes.glb")).unwrap();

    assert_eq!(&bytes[0..4], b"glTF");
    assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 2);
    assert_eq!(
        u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize,
        bytes.len()
    );
}

#[test]
fn statistics_cover_the_whole_run() {
    let (_dir, summary) = run_model(MODEL);

    let raw = fs::read_to_string(summary.statistics_path().unwrap()).unwrap();
    let stats: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(stats["filename"], "model.ifc");
    assert_eq!(stats["total_elements"], 3);

    let breakdown = stats["breakdown"].as_array().unwrap();
    assert_eq!(breakdown.len(), 3);
    assert!(breakdown.iter().any(|line| {
        line["type"] == "IFCPIPESEGMENT" && line["count"] == 1 && line["category"] == "pipes"
    }));
}

#[test]
fn manifests_key_elements_by_global_id() {
    let (dir, _) = run_model(MODEL);

    let raw = fs::read_to_string(dir.path().join("out/walls.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &manifest["2O2Fr$t4X7Zf8NOew3F100"];
    assert_eq!(entry["name"], "Basic Wall");
    assert_eq!(entry["type"], "IFCWALL");
    assert_eq!(entry["category"], "walls");
}

#[test]
fn malformed_statements_degrade_gracefully() {
    let broken = MODEL.replace(
        "#100=IFCWALL('2O2Fr$t4X7Zf8NOew3F100',$,'Basic Wall',$,$,#3,$,$);",
        "#100=IFCWALL('2O2Fr$t4X7Zf8NOew3F100',$,'Basic Wall',$,$,#3,$,$,;\n",
    );
    let (dir, summary) = run_model(&broken);
    let out = dir.path().join("out");

    // The wall is lost; the other disciplines still export.
    assert_eq!(summary.exported().len(), 2);
    assert!(out.join("pipes.glb").exists());
    assert!(out.join("ducts.glb").exists());
}

#[test]
fn unreadable_input_is_a_fatal_error() {
    let dir = TempDir::new().unwrap();
    let splitter = Splitter::new(AppConfig::default());
    let result = splitter.run(&dir.path().join("missing.ifc"), &dir.path().join("out"));
    assert!(matches!(result, Err(bimsplit::SplitError::Io(_))));
}
