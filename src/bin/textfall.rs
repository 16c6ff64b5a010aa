use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "textfall", version)]
struct Cli {
    /// Log engine activity to stderr.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decompose a document and print the resulting markup.
    Prepare(InputArgs),
    /// Run one full cycle on the virtual clock and check the round trip.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine config JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the config seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Write every phase event as JSON to this path.
    #[arg(long)]
    trace: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }
    match cli.cmd {
        Command::Prepare(args) => cmd_prepare(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn load(args: &InputArgs) -> anyhow::Result<(textfall::Document, textfall::EngineConfig)> {
    let doc = textfall::Document::from_path(&args.in_path)?;
    let mut cfg = match &args.config {
        Some(path) => textfall::EngineConfig::from_path(path)?,
        None => textfall::EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    cfg.validate()?;
    Ok((doc, cfg))
}

fn cmd_prepare(args: InputArgs) -> anyhow::Result<()> {
    let (mut doc, cfg) = load(&args)?;
    let selectors = cfg.selectors()?;
    let timing = textfall::TimingConfig::resolve(&cfg.timing_reader());
    let mut snapshots = textfall::SnapshotStore::default();
    let mut rng = textfall::Rng64::new(cfg.seed);

    let report = textfall::prepare(
        &mut doc,
        &mut snapshots,
        textfall::DecomposeOptions {
            selectors: &selectors,
            excluded_ancestors: &cfg.excluded_ancestors,
            ignored_subtrees: &cfg.ignored_subtrees,
            max_units: cfg.max_units,
            pop_max_delay: timing.pop_max_delay,
        },
        &mut rng,
    );

    let out = serde_json::json!({
        "success": report.success,
        "total_units": report.total_units,
        "processed_containers": report.processed_containers.len(),
        "markup": textfall::inner_html(&doc, doc.root()),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let (doc, cfg) = load(&args.input)?;
    let original = textfall::inner_html(&doc, doc.root());

    let mut ctl = textfall::FallController::new(doc, cfg)?;
    ctl.handle(textfall::Signal::LoadComplete);
    let activation = ctl.activate();
    ctl.run_until_idle();

    let restored = textfall::inner_html(ctl.document(), ctl.document().root());
    let identical = restored == original;

    if let Some(path) = &args.trace {
        write_trace(path, ctl.events())?;
    }

    let out = serde_json::json!({
        "activation": activation,
        "stats": ctl.stats(),
        "finished_at": ctl.now(),
        "timeline": ctl.events(),
        "restored_identical": identical,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    if !identical {
        anyhow::bail!("restored markup differs from the original");
    }
    Ok(())
}

fn write_trace(path: &Path, events: &[textfall::PhaseEvent]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create trace dir '{}'", parent.display()))?;
    }
    let json = serde_json::to_vec_pretty(events)?;
    std::fs::write(path, json).with_context(|| format!("write trace '{}'", path.display()))?;
    Ok(())
}
