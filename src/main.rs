use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::time::Duration;

use wip_queue::condition;
use wip_queue::config::QueueConfig;
use wip_queue::queue::QueuePlan;
use wip_queue::rules::{ActionExecutor, DefinitionLoader, ProcessLauncher, RuleDefinition};
use wip_queue::{Environment, QueueEngine};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Rule definitions XML (overrides the configured path)
    #[arg(short, long, global = true)]
    defaults: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest project files and print the queue plan
    Plan {
        /// Project file(s) in XML
        files: Vec<PathBuf>,

        /// Queue position edit as HASH=POSITION (hash prefixes accepted)
        #[arg(short, long = "position")]
        positions: Vec<String>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a condition against field values
    Check {
        /// Condition text; separate lines with '\n' or repeat the flag
        #[arg(short = 'e', long = "condition", required = true)]
        conditions: Vec<String>,

        /// Field value as NAME=VALUE
        #[arg(short, long = "set")]
        fields: Vec<String>,
    },
    /// Poll a directory of project files and keep the plan current
    Watch {
        /// Directory with *.xml project files
        #[arg(short = 'w', long)]
        dir: Option<PathBuf>,

        /// Seconds between scans
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Execute one rule definition against a project
    Run {
        /// Project file in XML
        file: PathBuf,

        /// Index of the rule definition, as listed by `plan`
        #[arg(short, long)]
        rule: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => QueueConfig::load(path)?,
        None => QueueConfig::default(),
    }
    .apply_env()?;
    if let Some(defaults) = args.defaults {
        config.defaults_path = defaults;
    }

    match args.command {
        Commands::Plan {
            files,
            positions,
            json,
        } => {
            let mut engine = QueueEngine::new(load_definitions(&config.defaults_path)?);
            let files: Vec<PathBuf> = config.project_files.iter().cloned().chain(files).collect();
            for file in &files {
                let raw = std::fs::read_to_string(file)
                    .with_context(|| format!("reading {}", file.display()))?;
                if let Err(e) = engine.ingest(&raw) {
                    log::warn!("Skipping {}: {}", file.display(), e);
                }
            }

            let mut edits = Vec::new();
            for edit in &positions {
                let Some((prefix, position)) = edit.split_once('=') else {
                    bail!("position edit '{}' is not HASH=POSITION", edit);
                };
                edits.push((engine.resolve_hash(prefix.trim())?, position.to_string()));
            }
            engine.set_queue_positions_text(edits)?;

            let plan = engine.reorder();
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print!("{}", render_plan(&plan));
            }
            prepare_active(&config, &plan).await;
        }
        Commands::Check { conditions, fields } => {
            let mut env = Environment::new();
            for field in &fields {
                let Some((name, value)) = field.split_once('=') else {
                    bail!("field '{}' is not NAME=VALUE", field);
                };
                env.set_text(name.trim(), value);
            }

            let lines: Vec<String> = conditions
                .iter()
                .flat_map(|c| c.split("\\n").map(str::to_string))
                .collect();
            let parsed = condition::parse_all(&lines)?;
            for clause in &parsed {
                println!(
                    "{:<40} {}",
                    clause.to_string(),
                    condition::evaluate_condition(clause, &env)
                );
            }
            println!("=> {}", condition::evaluate(&parsed, &env));
        }
        Commands::Watch { dir, interval } => {
            let dir = dir
                .or_else(|| config.watch_dir.clone())
                .context("no watch directory given (use --dir or WIP_QUEUE_WATCH_DIR)")?;
            let secs = interval.unwrap_or(config.poll_interval_secs).max(1);
            watch(&config, &dir, Duration::from_secs(secs)).await?;
        }
        Commands::Run { file, rule } => {
            let mut engine = QueueEngine::new(load_definitions(&config.defaults_path)?);
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let hash = engine.ingest(&raw)?.source_hash.clone();

            let executor = ActionExecutor::default();
            match engine.execute(&executor, &hash, rule).await {
                Ok(outcome) => println!("{:?}", outcome),
                Err(e) => log::error!("Rule #{} failed: {}", rule, e),
            }

            if let Some(item) = engine.store().get(&hash) {
                println!("{}", serde_json::to_string_pretty(&item.attributes)?);
            }
        }
    }

    Ok(())
}

/// Missing definitions file means no configured rules
fn load_definitions(path: &Path) -> anyhow::Result<Vec<RuleDefinition>> {
    if !path.exists() {
        log::warn!("No rule definitions at {}", path.display());
        return Ok(Vec::new());
    }
    DefinitionLoader::new()
        .load_file(path)
        .with_context(|| format!("loading {}", path.display()))
}

fn render_plan(plan: &QueuePlan) -> String {
    let mut out = String::new();
    for entry in &plan.entries {
        let marker = if entry.active { "*" } else { " " };
        let rules: Vec<String> = entry
            .rules
            .iter()
            .map(|r| format!("{} ({})", r.label(), r.color()))
            .collect();
        out.push_str(&format!(
            "{} [{:>3}] {:<24} {}  {}\n",
            marker,
            entry.item.queue_position,
            entry.item.name(),
            entry.item.short_hash(),
            rules.join(", ")
        ));
    }
    out
}

/// Launch the configured prepare command for the active item only
async fn prepare_active(config: &QueueConfig, plan: &QueuePlan<'_>) {
    if let Err(e) = QueueEngine::prepare_active(plan, config, &ProcessLauncher).await {
        log::warn!("Prepare command failed: {}", e);
    }
}

async fn watch(config: &QueueConfig, dir: &Path, every: Duration) -> anyhow::Result<()> {
    let mut engine = QueueEngine::new(load_definitions(&config.defaults_path)?);
    let mut ticker = tokio::time::interval(every);
    let mut last_active: Option<String> = None;

    log::info!("Watching {} every {:?}", dir.display(), every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Stopping");
                return Ok(());
            }
        }

        let sources = match read_sources(dir).await {
            Ok(sources) => sources,
            Err(e) => {
                log::warn!("Scan of {} failed: {}", dir.display(), e);
                continue;
            }
        };
        let count = engine.refresh(sources);
        let plan = engine.reorder();
        log::info!("{} items queued", count);

        let active = plan.active().map(|e| e.item.source_hash.clone());
        if active != last_active {
            print!("{}", render_plan(&plan));
            prepare_active(config, &plan).await;
            last_active = active;
        }
    }
}

/// Contents of every `*.xml` file in `dir`, sorted by file name
async fn read_sources(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "xml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(tokio::fs::read_to_string(&path).await?);
    }
    Ok(sources)
}
