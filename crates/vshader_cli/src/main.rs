// SPDX-License-Identifier: MIT OR Apache-2.0
//! `vshaderc` - compile saved visual shader graphs to shader text.
//!
//! Loads a graph in the line-oriented save format, compiles it (or a
//! preview of one node output) and writes the shader source. Diagnostics go
//! to the log; any error diagnostic makes the process exit with failure.

mod settings;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use settings::{CliSettings, SETTINGS_FILE_NAME};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use vshader_graph::{CompiledShader, NodeId, NodeRegistry, ShaderGraph, ShaderMode, Stage};

#[derive(Parser, Debug)]
#[command(name = "vshaderc", version)]
struct Cli {
    /// Settings file (RON).
    #[arg(long, global = true, default_value = SETTINGS_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile every stage of a saved graph.
    Compile(CompileArgs),
    /// Compile a canvas-item preview of one node output.
    Preview(PreviewArgs),
    /// List the registered node kinds.
    Kinds(KindsArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Spatial,
    Canvas,
    Particles,
}

impl From<ModeArg> for ShaderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Spatial => ShaderMode::Spatial,
            ModeArg::Canvas => ShaderMode::CanvasItem,
            ModeArg::Particles => ShaderMode::Particles,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StageArg {
    Vertex,
    Fragment,
    Light,
}

impl From<StageArg> for Stage {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Vertex => Stage::Vertex,
            StageArg::Fragment => Stage::Fragment,
            StageArg::Light => Stage::Light,
        }
    }
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Saved graph.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output shader path; defaults to the configured output directory, or stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Switch the graph to this mode before compiling.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Saved graph.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Stage holding the node.
    #[arg(long, value_enum, default_value_t = StageArg::Fragment)]
    stage: StageArg,

    /// Node id.
    #[arg(long)]
    node: NodeId,

    /// Output port index.
    #[arg(long, default_value_t = 0)]
    port: usize,

    /// Output shader path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct KindsArgs {
    /// Only kinds usable in this mode.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Only kinds usable in this stage.
    #[arg(long, value_enum, default_value_t = StageArg::Fragment)]
    stage: StageArg,
}

fn init_tracing(settings: &CliSettings) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = CliSettings::load(&cli.config)
        .with_context(|| format!("load settings '{}'", cli.config.display()))?;
    init_tracing(&settings);
    tracing::debug!("vshaderc v{}", env!("CARGO_PKG_VERSION"));

    let registry = NodeRegistry::default();
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args, &settings, &registry),
        Command::Preview(args) => cmd_preview(args, &settings, &registry),
        Command::Kinds(args) => {
            cmd_kinds(&args, &registry);
            Ok(())
        }
    }
}

fn load_graph(path: &Path, settings: &CliSettings, registry: &NodeRegistry) -> anyhow::Result<ShaderGraph> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read graph '{}'", path.display()))?;
    let mut graph =
        vshader_graph::load(&text, registry).with_context(|| format!("load graph '{}'", path.display()))?;
    if let Some(mode) = settings.default_mode_override {
        graph.set_mode(mode);
    }
    Ok(graph)
}

fn cmd_compile(args: CompileArgs, settings: &CliSettings, registry: &NodeRegistry) -> anyhow::Result<()> {
    let mut graph = load_graph(&args.in_path, settings, registry)?;
    if let Some(mode) = args.mode {
        graph.set_mode(mode.into());
    }
    let compiled = graph.rebuild();

    let out = args.out.or_else(|| {
        let stem = args.in_path.file_stem()?;
        let dir = settings.output_dir.as_ref()?;
        Some(dir.join(stem).with_extension("shader"))
    });
    write_output(&compiled, out.as_deref(), settings.emit_uniform_manifest)?;
    report(&compiled)
}

fn cmd_preview(args: PreviewArgs, settings: &CliSettings, registry: &NodeRegistry) -> anyhow::Result<()> {
    let graph = load_graph(&args.in_path, settings, registry)?;
    let stage = Stage::from(args.stage);
    let compiled = graph.generate_preview(stage, args.node, args.port).with_context(|| {
        format!(
            "node {} of the {stage} stage has no previewable output port {}",
            args.node, args.port
        )
    })?;
    write_output(&compiled, args.out.as_deref(), false)?;
    report(&compiled)
}

fn cmd_kinds(args: &KindsArgs, registry: &NodeRegistry) {
    let stage = Stage::from(args.stage);
    let types: Vec<_> = match args.mode {
        Some(mode) => registry.types_for(mode.into(), stage).collect(),
        None => registry.types().collect(),
    };
    for node_type in types {
        println!("{:<28} {:<24} {:?}", node_type.kind, node_type.name, node_type.category);
    }
}

fn write_output(compiled: &CompiledShader, out: Option<&Path>, manifest: bool) -> anyhow::Result<()> {
    let Some(out) = out else {
        print!("{}", compiled.source);
        return Ok(());
    };

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, &compiled.source).with_context(|| format!("write shader '{}'", out.display()))?;
    tracing::info!("wrote {}", out.display());

    if manifest {
        let path = out.with_extension("uniforms.ron");
        let text = ron::ser::to_string_pretty(&compiled.uniforms, ron::ser::PrettyConfig::default())
            .context("serialize uniform manifest")?;
        std::fs::write(&path, text).with_context(|| format!("write uniform manifest '{}'", path.display()))?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

fn report(compiled: &CompiledShader) -> anyhow::Result<()> {
    for warning in compiled.warnings() {
        tracing::warn!("{warning}");
    }
    for error in compiled.errors() {
        tracing::error!("{error}");
    }
    let errors = compiled.errors().count();
    if errors > 0 {
        anyhow::bail!("compilation produced {errors} error(s)");
    }
    Ok(())
}
