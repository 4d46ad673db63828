use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use portfolio_client::config::{Config, ConfigOverrides, DisplayConfig};
use portfolio_client::dispatch::{DispatchError, HttpOptimizer, OptimizationService};
use portfolio_client::form::{EntryId, FormModel};
use portfolio_client::model::{OptimizationRequest, OptimizationSummary, ValidatedRequest};
use portfolio_client::output::csv::{selected_to_csv, series_to_csv};
use portfolio_client::output::json::render_json;
use portfolio_client::output::table::{
    render_form_table, render_health, render_optimization_summary, render_result,
};
use portfolio_client::render::{ResultRenderer, ResultView};
use portfolio_client::session::{describe_failure, ExampleSource, Intent, Outcome, Session};
use portfolio_client::shell::{parse_line, ShellCommand, HELP};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "portfolio-client",
    about = "Submit project portfolios to the optimization service"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short = 'u', long = "base-url")]
    base_url: Option<String>,
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate and submit one portfolio.
    Optimize {
        #[arg(long)]
        capacity: Option<String>,
        /// Project as `name:cost:expected_gain`; repeatable.
        #[arg(short, long = "entry")]
        entries: Vec<String>,
        /// JSON request body instead of flags.
        #[arg(short, long, conflicts_with_all = ["capacity", "entries"])]
        file: Option<PathBuf>,
        /// Use the plain endpoint and print only the selection summary.
        #[arg(long)]
        summary_only: bool,
    },
    /// Show the example portfolio, optionally submitting it.
    Example {
        #[arg(long)]
        local: bool,
        #[arg(long)]
        run: bool,
    },
    Health,
    /// Interactive form session.
    Shell,
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        base_url: cli.base_url.clone(),
        timeout_secs: cli.timeout_secs,
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }

    let service = HttpOptimizer::new(&config.service)?;
    info!("using optimization service at {}", service.base_url());

    match &cli.command {
        Commands::Optimize {
            capacity,
            entries,
            file,
            summary_only,
        } => {
            let request = match file {
                Some(path) => read_request(path)?,
                None => form_from_args(capacity.as_deref(), entries)?.build_request(),
            };
            let request = request
                .into_validated()
                .map_err(|errors| anyhow!("cannot submit:\n{errors}"))?;
            if *summary_only {
                let summary = service.optimize(&request).await.map_err(failure)?;
                print_summary(&summary, cli.output, &config.display)?;
            } else {
                submit_detailed(&service, &request, cli.output, &config.display).await?;
            }
        }
        Commands::Example { local, run } => {
            run_example(service, &config, *local, *run, cli.output).await?;
        }
        Commands::Health => match service.health().await {
            Ok(status) => match cli.output {
                OutputFormat::Table => println!("{}", render_health(&status)),
                _ => println!("{}", render_json(&status)?),
            },
            Err(error) => {
                warn!("health probe failed: {error}");
                return Err(failure(error));
            }
        },
        Commands::Shell => run_shell(service, &config, cli.output).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn failure(error: DispatchError) -> anyhow::Error {
    anyhow!(describe_failure(&error))
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn read_request(path: &Path) -> Result<OptimizationRequest> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading request file: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("invalid request JSON: {}", path.display()))
}

/// Fills a form from `--capacity` and `name:cost:gain` flags. Names may contain `:`.
fn form_from_args(capacity: Option<&str>, entries: &[String]) -> Result<FormModel> {
    let mut form = FormModel::new();
    form.set_capacity(capacity.unwrap_or_default());
    let first = EntryId::new(1);
    if entries.is_empty() {
        form.remove_entry(first);
    }
    for (index, raw) in entries.iter().enumerate() {
        let mut parts = raw.rsplitn(3, ':');
        let (Some(gain), Some(cost), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(anyhow!(
                "invalid --entry {raw:?}, expected name:cost:expected_gain"
            ));
        };
        let id = if index == 0 { first } else { form.add_entry() };
        form.set_name(id, name);
        form.set_cost(id, cost);
        form.set_expected_gain(id, gain);
    }
    Ok(form)
}

async fn submit_detailed<S: OptimizationService>(
    service: &S,
    request: &ValidatedRequest,
    format: OutputFormat,
    display: &DisplayConfig,
) -> Result<()> {
    let result = service.optimize_detailed(request).await.map_err(failure)?;
    let mut renderer = ResultRenderer::new();
    let view = renderer.render(&result);
    print_result(&view, format, display)
}

async fn run_example(
    service: HttpOptimizer,
    config: &Config,
    local: bool,
    run: bool,
    format: OutputFormat,
) -> Result<()> {
    let (payload, source) = if local {
        (OptimizationRequest::local_example(), ExampleSource::Local)
    } else {
        let mut session = Session::new(service.clone(), config.examples.preferred_case.clone());
        match session.handle(Intent::LoadExample).await {
            Outcome::ExampleLoaded(source) => (session.form().build_request(), source),
            other => return Err(anyhow!("unexpected outcome loading example: {other:?}")),
        }
    };

    match format {
        OutputFormat::Table => {
            let mut form = FormModel::new();
            form.populate(&payload);
            println!("{}", describe_source(&source));
            println!("{}", render_form_table(&form));
        }
        OutputFormat::Json => println!("{}", render_json(&payload)?),
        OutputFormat::Csv => {
            warn!("CSV output for example not implemented, using JSON");
            println!("{}", render_json(&payload)?);
        }
    }

    if run {
        let request = payload
            .into_validated()
            .map_err(|errors| anyhow!("example is not submittable:\n{errors}"))?;
        submit_detailed(&service, &request, format, &config.display).await?;
    }
    Ok(())
}

async fn run_shell(service: HttpOptimizer, config: &Config, format: OutputFormat) -> Result<()> {
    let mut session = Session::new(service, config.examples.preferred_case.clone());
    // Probe failures are only logged.
    session.handle(Intent::CheckHealth).await;

    println!("{HELP}\n");
    println!("{}", render_form_table(session.form()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_line(&line) {
            Err(error) => println!("{error}"),
            Ok(ShellCommand::Nothing) => {}
            Ok(ShellCommand::Quit) => break,
            Ok(ShellCommand::Help) => println!("{HELP}"),
            Ok(ShellCommand::Show) => println!("{}", render_form_table(session.form())),
            Ok(ShellCommand::Run(intent)) => {
                let outcome = session.handle(intent).await;
                present(&session, &outcome, format, &config.display)?;
            }
        }
    }
    Ok(())
}

fn present<S: OptimizationService>(
    session: &Session<S>,
    outcome: &Outcome,
    format: OutputFormat,
    display: &DisplayConfig,
) -> Result<()> {
    match outcome {
        Outcome::FormChanged => println!("{}", render_form_table(session.form())),
        Outcome::EntryAdded(id) => {
            println!("Added project {id}");
            println!("{}", render_form_table(session.form()));
        }
        Outcome::Unchanged => println!("No such project"),
        Outcome::Invalid(errors) => println!("Cannot submit:\n{errors}"),
        Outcome::Rendered(view) => print_result(view, format, display)?,
        Outcome::ServiceError(detail) => println!("Service error: {detail}"),
        Outcome::Unreachable(message) => println!("{message}"),
        Outcome::ExampleLoaded(source) => {
            println!("{}", describe_source(source));
            println!("{}", render_form_table(session.form()));
        }
        Outcome::Healthy(status) => println!("{}", render_health(status)),
        Outcome::Unhealthy(message) => println!("{message}"),
    }
    Ok(())
}

fn describe_source(source: &ExampleSource) -> String {
    match source {
        ExampleSource::Remote { case } => format!("Example {case} loaded from the service"),
        ExampleSource::Local => {
            "Service examples unavailable, loaded the built-in example".to_string()
        }
    }
}

fn print_result(view: &ResultView, format: OutputFormat, display: &DisplayConfig) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_result(view, display)),
        OutputFormat::Json => println!("{}", render_json(view)?),
        OutputFormat::Csv => {
            println!("{}", selected_to_csv(view)?);
            println!("{}", series_to_csv(&view.cost_distribution)?);
            println!("{}", series_to_csv(&view.efficiency)?);
        }
    }
    Ok(())
}

fn print_summary(
    summary: &OptimizationSummary,
    format: OutputFormat,
    display: &DisplayConfig,
) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_optimization_summary(summary, display)),
        OutputFormat::Json => println!("{}", render_json(summary)?),
        OutputFormat::Csv => {
            warn!("CSV output for summary not implemented, using JSON");
            println!("{}", render_json(summary)?);
        }
    }
    Ok(())
}
