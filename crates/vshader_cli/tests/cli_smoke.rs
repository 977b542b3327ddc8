// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end runs of the `vshaderc` binary.

use std::path::PathBuf;
use std::process::Command;

const GRAPH: &str = "\
mode = spatial
nodes/fragment/2 = scalar_constant
nodes/fragment/2/constant = 3.5
node_connections/fragment = [2, 0, 0, 0]
";

fn work_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("vshaderc_smoke").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn vshaderc() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vshaderc"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_compile_writes_shader() {
    let dir = work_dir("compile");
    let graph_path = dir.join("graph.vsg");
    let out_path = dir.join("graph.shader");
    let _ = std::fs::remove_file(&out_path);
    std::fs::write(&graph_path, GRAPH).unwrap();

    let status = vshaderc()
        .arg("--config")
        .arg(dir.join("missing.ron"))
        .arg("compile")
        .arg("--in")
        .arg(&graph_path)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());

    let shader = std::fs::read_to_string(&out_path).unwrap();
    assert!(shader.starts_with("shader_type spatial;"));
    assert!(shader.contains("n2_0 = 3.500000;"));
    assert!(shader.contains("ALBEDO = vec3(n2_0);"));
}

#[test]
fn cli_preview_to_stdout() {
    let dir = work_dir("preview");
    let graph_path = dir.join("graph.vsg");
    std::fs::write(&graph_path, GRAPH).unwrap();

    let output = vshaderc()
        .arg("--config")
        .arg(dir.join("missing.ron"))
        .args(["preview", "--node", "2", "--in"])
        .arg(&graph_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let source = String::from_utf8(output.stdout).unwrap();
    assert!(source.starts_with("shader_type canvas_item;"));
    assert!(source.contains("COLOR.rgb = vec3(n2_0);"));
}

#[test]
fn cli_rejects_broken_graph() {
    let dir = work_dir("broken");
    let graph_path = dir.join("graph.vsg");
    std::fs::write(&graph_path, "nodes/fragment/2 = no_such_kind\n").unwrap();

    let status = vshaderc()
        .arg("--config")
        .arg(dir.join("missing.ron"))
        .arg("compile")
        .arg("--in")
        .arg(&graph_path)
        .status()
        .unwrap();
    assert!(!status.success());
}
