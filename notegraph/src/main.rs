use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notegraph::query::{run_interactive, Session, TEMPLATES};
use notegraph::{BuildPipeline, Config, QueryEngine};

#[derive(Parser)]
#[command(name = "notegraph")]
#[command(about = "Build and query an entity graph from a personal notes vault")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON). Falls back to NOTEGRAPH_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a vault into a Turtle graph file
    Build {
        /// Vault root directory
        vault: PathBuf,

        /// Output graph file
        #[arg(short, long, default_value = "knowledge.ttl")]
        output: PathBuf,

        /// Print the build statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Query a graph file
    Query(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// Graph file written by `build`
    graph: PathBuf,

    /// Raw SELECT query
    #[arg(short, long, conflicts_with_all = ["template", "interactive", "list_templates"])]
    query: Option<String>,

    /// Named query template
    #[arg(short, long, conflicts_with_all = ["interactive", "list_templates"])]
    template: Option<String>,

    /// Template parameter
    #[arg(long, default_value = "")]
    param: String,

    /// Read queries from standard input
    #[arg(short, long, conflicts_with = "list_templates")]
    interactive: bool,

    /// Print the template library and exit
    #[arg(long)]
    list_templates: bool,

    /// Print results as SPARQL JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Build {
            vault,
            output,
            json,
        } => {
            let pipeline = BuildPipeline::new(config)?;
            let stats = pipeline
                .build_to_file(&vault, &output)
                .with_context(|| format!("Build of {} failed", vault.display()))?;
            if json {
                let mut stdout = io::stdout().lock();
                serde_json::to_writer_pretty(&mut stdout, &stats)?;
                writeln!(stdout)?;
                return Ok(());
            }
            println!(
                "Wrote {} triples to {} (persons: {}, projects: {}, meetings: {}, organizations: {}, topics: {}, skipped documents: {})",
                stats.triples,
                output.display(),
                stats.persons,
                stats.projects,
                stats.meetings,
                stats.organizations,
                stats.topics,
                stats.documents_skipped
            );
        }
        Command::Query(args) => run_query(args, &config)?,
    }

    Ok(())
}

fn run_query(args: QueryArgs, config: &Config) -> anyhow::Result<()> {
    if args.list_templates {
        for template in TEMPLATES {
            let param = if template.takes_param { " [param]" } else { "" };
            println!("{}{}\n    {}", template.name, param, template.description);
        }
        return Ok(());
    }

    let engine = QueryEngine::load(&args.graph)
        .with_context(|| format!("Failed to load graph {}", args.graph.display()))?;

    if args.interactive {
        let session = Session::new(&engine, config.output.max_cell_width);
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        run_interactive(&session, stdin.lock(), &mut stdout)?;
        return Ok(());
    }

    let result = match (&args.query, &args.template) {
        (Some(query), _) => engine.execute(query)?,
        (None, Some(template)) => engine.run_template(template, &args.param)?,
        (None, None) => {
            anyhow::bail!("one of --query, --template, --interactive or --list-templates is required")
        }
    };

    let mut stdout = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &result.to_json())?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "{}", result.to_table(config.output.max_cell_width))?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notegraph=info".into());
    let json = std::env::var("NOTEGRAPH_LOG_FORMAT").is_ok_and(|format| format == "json");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}
