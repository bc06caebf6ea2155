use std::{
    env,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

type BoxError = Box<dyn std::error::Error>;

/// Snapshot flavours generated for every trajectory file: suffix and the
/// helper in `crate::testing` that renders it.
const SNAPSHOTS: [(&str, &str); 2] = [
    ("tokens", "snapshot_tokens_from_str"),
    ("parsed", "snapshot_from_str"),
];

fn main() -> Result<(), BoxError> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let data_dir = manifest_dir.join("test-data");
    println!("cargo:rerun-if-changed={}", data_dir.display());

    let mut files = trajectory_files(&data_dir)?;
    files.sort();

    let mut buffer = String::new();
    writeln!(buffer, "use insta::assert_snapshot;")?;
    writeln!(
        buffer,
        "use crate::testing::{{snapshot_from_str, snapshot_tokens_from_str}};"
    )?;

    for path in files {
        println!("cargo:rerun-if-changed={}", path.display());
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("trajectory");
        let rel = to_unix_path(path.strip_prefix(&manifest_dir)?);
        let ident = sanitize_ident(stem);

        for (suffix, helper) in SNAPSHOTS {
            writeln!(buffer)?;
            writeln!(buffer, "#[test]")?;
            writeln!(buffer, "fn snapshot_{ident}_{suffix}() {{")?;
            writeln!(
                buffer,
                "    let input = include_str!(concat!(env!(\"CARGO_MANIFEST_DIR\"), \"/{rel}\"));"
            )?;
            writeln!(buffer, "    let snapshot = {helper}(input);")?;
            writeln!(
                buffer,
                "    insta::with_settings!({{snapshot_path => concat!(env!(\"CARGO_MANIFEST_DIR\"), \"/test-data\"), prepend_module_to_snapshot => false}}, {{"
            )?;
            writeln!(buffer, "        assert_snapshot!(\"{stem}.{suffix}\", snapshot);")?;
            writeln!(buffer, "    }});")?;
            writeln!(buffer, "}}")?;
        }
    }

    let dest = PathBuf::from(env::var("OUT_DIR")?).join("generated_tests.rs");
    fs::write(dest, buffer)?;
    Ok(())
}

fn trajectory_files(dir: &Path) -> Result<Vec<PathBuf>, BoxError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("traj") {
            files.push(path);
        }
    }
    Ok(files)
}

fn sanitize_ident(stem: &str) -> String {
    let mut ident: String = stem
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if ident.is_empty() {
        ident.push_str("trajectory");
    }
    ident
}

fn to_unix_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
