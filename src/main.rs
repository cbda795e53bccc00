//! Standup - weekly progress summaries from GitLab and Asana.
//!
//! Collects merge requests and Asana tasks for a reporting window and has a
//! language model write the status update.

use std::io;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use standup::ai::AIManager;
use standup::core::{env, split_list, Config, DateRange, Prompter, ResolvedEnv};
use standup::integrations::{AsanaClient, GitLabClient};
use standup::summary::{collect_progress, handle_progress_summary, SummaryRequest, TaskBucket};

/// Weekly progress summaries from GitLab and Asana
#[derive(Parser)]
#[command(name = "standup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    summary: SummaryArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a progress summary (default)
    Summary(SummaryArgs),

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// List the Asana project's sections and the bucket each maps to
    Sections {
        /// Asana project GID (defaults to the configured one)
        #[arg(long, value_name = "ID")]
        asana_project: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args, Clone, Default)]
struct SummaryArgs {
    /// First day of the window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    from: Option<String>,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    to: Option<String>,

    /// Comma-separated GitLab project names
    #[arg(long, value_name = "NAMES")]
    gitlab_projects: Option<String>,

    /// Asana project GID
    #[arg(long, value_name = "ID")]
    asana_project: Option<String>,

    /// Print the collected report as JSON instead of asking the model
    #[arg(long)]
    json: bool,

    /// Never prompt; fail when something is missing
    #[arg(short, long)]
    non_interactive: bool,

    /// Do not offer to save prompted values
    #[arg(long)]
    no_save: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn,standup=info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    // Handle commands
    match cli.command {
        None => cmd_summary(cli.summary)?,
        Some(Commands::Summary(args)) => cmd_summary(args)?,
        Some(Commands::Config { path }) => cmd_config(path)?,
        Some(Commands::Sections { asana_project }) => cmd_sections(asana_project)?,
        Some(Commands::Completions { shell }) => cmd_completions(shell),
    }

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "standup", &mut io::stdout());
}

/// Show configuration.
fn cmd_config(show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::find().or_else(Config::global_path) {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

/// List project sections with their categorization.
fn cmd_sections(asana_project: Option<String>) -> Result<()> {
    if let Some(path) = env::env_file_path() {
        env::load_env_file(&path)?;
    }

    let config = Config::load()?;
    let resolved = ResolvedEnv::from_env()?;
    let project_gid = asana_project
        .or(config.asana.project_id)
        .ok_or_else(|| anyhow::anyhow!("No Asana project given; pass --asana-project"))?;

    let client = AsanaClient::from_env(&resolved);
    let rt = tokio::runtime::Runtime::new()?;
    let sections = rt
        .block_on(client.project_sections(&project_gid))
        .with_context(|| format!("Failed to list sections of project {}", project_gid))?;

    let mapping = &config.asana.section_mapping;
    for section in sections {
        let bucket = match mapping.classify(&section.name) {
            Some(TaskBucket::InProgress) => "in progress",
            Some(TaskBucket::Blocked) => "blocked",
            None => "-",
        };
        println!("{:<40} {}", section.name, bucket);
    }

    Ok(())
}

/// Values that were asked for rather than given.
#[derive(Default)]
struct Prompted {
    env: Vec<(String, String)>,
    projects: bool,
}

/// Generate a progress summary.
fn cmd_summary(args: SummaryArgs) -> Result<()> {
    let env_path = env::env_file_path();
    if let Some(path) = &env_path {
        env::load_env_file(path)?;
    }

    let config = Config::load()?;
    let mut prompter = Prompter::stdio();
    let mut prompted = Prompted::default();

    let resolved = resolve_env(&args, &mut prompter, &mut prompted)?;
    let date_range = resolve_date_range(&args, &mut prompter)?;

    let gitlab_projects = match &args.gitlab_projects {
        Some(names) => split_list(names),
        None if !config.gitlab.project_names.is_empty() || args.non_interactive => {
            config.gitlab.project_names.clone()
        }
        None => {
            prompted.projects = true;
            prompter.list("GitLab project names (comma-separated)", &[])?
        }
    };
    if gitlab_projects.is_empty() {
        tracing::warn!("No GitLab projects configured; merge requests will be skipped");
    }

    let project_gid = match args.asana_project.clone().or_else(|| config.asana.project_id.clone()) {
        Some(id) => id,
        None if args.non_interactive => {
            anyhow::bail!("No Asana project given; pass --asana-project or save one in the config")
        }
        None => {
            prompted.projects = true;
            prompter.input("Asana project GID", None)?
        }
    };

    if !args.no_save && !args.non_interactive {
        offer_to_save(&mut prompter, &prompted, env_path.as_deref(), &gitlab_projects, &project_gid)?;
    }

    let request = SummaryRequest {
        date_range,
        gitlab_projects,
        workspace_gid: resolved.asana_workspace_gid.clone(),
        project_gid,
        section_mapping: config.asana.section_mapping.clone(),
    };

    print_header(&request);

    let code_host = GitLabClient::from_env(&resolved);
    let tracker = AsanaClient::from_env(&resolved);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        if args.json {
            let report = collect_progress(&code_host, &tracker, &request).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let manager = AIManager::from_config(&config.ai).await?;
        if !manager.is_available() {
            anyhow::bail!(
                "No AI provider available. Set GOOGLE_GENERATIVE_AI_API_KEY or ANTHROPIC_API_KEY, or start Ollama."
            );
        }

        let summary = handle_progress_summary(&code_host, &tracker, &manager, &request).await?;
        println!("{}", summary.trim());
        Ok(())
    })
}

/// Resolve credentials, prompting for whatever is missing.
fn resolve_env<R: io::BufRead, W: io::Write>(
    args: &SummaryArgs,
    prompter: &mut Prompter<R, W>,
    prompted: &mut Prompted,
) -> Result<ResolvedEnv> {
    let missing = env::missing_vars();
    if missing.is_empty() || args.non_interactive {
        return ResolvedEnv::from_env();
    }

    eprintln!("Some credentials are missing.");
    for var in missing {
        let value = if var.secret { prompter.secret(var.label)? } else { prompter.input(var.label, None)? };
        prompted.env.push((var.name.to_string(), value));
    }

    ResolvedEnv::from_env_with(&prompted.env)
}

/// Use `--from`/`--to` when both are given, otherwise ask with the current
/// week as default.
fn resolve_date_range<R: io::BufRead, W: io::Write>(
    args: &SummaryArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<DateRange> {
    let week = DateRange::current_week();
    let range = match (&args.from, &args.to) {
        (Some(from), Some(to)) => DateRange::new(from, to),
        (from, to) => {
            let default = DateRange::new(
                from.clone().unwrap_or(week.from),
                to.clone().unwrap_or(week.to),
            );
            if args.non_interactive {
                default
            } else {
                prompter.date_range(&default)?
            }
        }
    };

    range.validate()?;
    Ok(range)
}

fn offer_to_save<R: io::BufRead, W: io::Write>(
    prompter: &mut Prompter<R, W>,
    prompted: &Prompted,
    env_path: Option<&std::path::Path>,
    gitlab_projects: &[String],
    project_gid: &str,
) -> Result<()> {
    if let (false, Some(path)) = (prompted.env.is_empty(), env_path) {
        if prompter.confirm(&format!("Save credentials to {}?", path.display()), true)? {
            env::save_env_file(path, &prompted.env)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            eprintln!("Saved credentials to {}", path.display());
        }
    }

    if prompted.projects && prompter.confirm("Save these projects for next time?", true)? {
        let path = Config::save_projects(gitlab_projects, project_gid)?;
        eprintln!("Saved projects to {}", path.display());
    }

    Ok(())
}

fn print_header(request: &SummaryRequest) {
    eprintln!("Progress summary: {} to {}", request.date_range.from, request.date_range.to);
    if request.gitlab_projects.is_empty() {
        eprintln!("GitLab projects: (none)");
    } else {
        eprintln!("GitLab projects: {}", request.gitlab_projects.join(", "));
    }
    eprintln!("Asana project: {}\n", request.project_gid);
}
