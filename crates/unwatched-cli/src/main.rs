mod commands;
mod console;
mod logging;
mod progress;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::Parser;
use colored::*;
use commands::{Cli, Commands, ReviewArgs};
use console::ConsolePrompter;
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info, warn};
use unwatched_core::archive::{Archiver, Offloader};
use unwatched_core::deletion::DeletionOrchestrator;
use unwatched_core::prompt::{self, Prompter};
use unwatched_core::report::{self, group_candidates};
use unwatched_core::{
    AppConfig, CandidateEngine, MetadataSource, RetentionWindow, RunPlan, TautulliClient,
};

fn main() {
    dotenv().ok();

    let config = match unwatched_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let _guard = logging::init_logger(&config.logging);

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Review(review)) => run_review(&config, &review),
        None => run_review(&config, &ReviewArgs::default()),
        Some(Commands::Libraries) => run_libraries(&config),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config.redacted());
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_libraries(config: &AppConfig) -> anyhow::Result<()> {
    let client = TautulliClient::new(&config.tautulli).context("building Tautulli client")?;
    let libraries = client
        .try_list_libraries()
        .context("listing Tautulli libraries")?;
    for lib in libraries {
        println!(
            "{:>4}  {:<30} {}",
            lib.section_id,
            lib.section_name.bold(),
            lib.section_type.dimmed()
        );
    }
    Ok(())
}

fn run_review(config: &AppConfig, args: &ReviewArgs) -> anyhow::Result<()> {
    let client = TautulliClient::new(&config.tautulli).context("building Tautulli client")?;
    let mut prompter = ConsolePrompter;

    let plan = match ask_plan(&client, &mut prompter)? {
        Some(plan) => plan,
        None => return Ok(()),
    };
    info!(
        days = plan.window.days(),
        operator = %plan.window.operator(),
        libraries = ?plan.libraries,
        "Looking for unwatched media"
    );

    let reporter = CliReporter::new();
    let engine = CandidateEngine::new(&client, &reporter);
    let now = Utc::now().timestamp();
    let candidates = engine.run(&plan, now);

    let operator = plan.window.operator();
    console::print_buckets(&group_candidates(&candidates.items, operator, now, &Local));
    println!(
        "\n{}",
        console::summary_line(candidates.len(), report::total_size(&candidates.items)).red()
    );

    let targets: Vec<PathBuf> = if plan.local_only {
        let resolver = config.resolver();
        if !resolver.is_configured() {
            warn!(
                "local.root_directory or local.relative_path_prefix is not set; \
                 no local files will match"
            );
        }
        let (found, _missing) = resolver.partition(&candidates.items);
        println!("\nFiltered results based on local files:");
        console::print_buckets(&group_candidates(&found, operator, now, &Local));
        found
            .iter()
            .filter_map(|item| resolver.local_path(&item.grandparent_title, &item.file_path))
            .collect()
    } else {
        candidates.paths().into_iter().map(PathBuf::from).collect()
    };

    if let Some(path) = &args.export {
        report::write_csv(path, &candidates.items)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Candidate list written to {}", path.display());
    }

    if targets.is_empty() {
        return Ok(());
    }

    if args.archive {
        archive(config, &targets, &mut prompter)?;
    }

    match &args.offload {
        Some(remote_dir) => offload(config, &targets, remote_dir, &mut prompter)?,
        None => {
            let outcome = DeletionOrchestrator::new(config.deletion.on_error)
                .run(&targets, &mut prompter);
            if outcome.aborted {
                warn!(
                    "Deletion stopped after a failure; {} files were not processed",
                    targets.len()
                        - outcome.removed.len()
                        - outcome.skipped.len()
                        - outcome.failed.len()
                );
            }
        }
    }

    Ok(())
}

/// Ask the operator for days, operator, libraries and the local-file filter.
/// Returns `None` when nothing was selected.
fn ask_plan(
    client: &TautulliClient,
    prompter: &mut dyn Prompter,
) -> anyhow::Result<Option<RunPlan>> {
    let days = prompt::parse_days(
        &prompter.ask("Enter the number of days to look back (default is 30): ")?,
    );
    let operator =
        prompt::parse_operator(&prompter.ask("Enter the filter operator (<= or >=): ")?);
    let window = RetentionWindow::new(days, operator)
        .context("retention window needs at least one day")?;

    let libraries = client.list_libraries();
    if libraries.is_empty() {
        warn!("No libraries available; nothing to process");
        return Ok(None);
    }

    println!("\nAvailable Libraries:");
    for (i, lib) in libraries.iter().enumerate() {
        println!("{}. {}", i + 1, lib.section_name);
    }
    let selection = prompter
        .ask("Enter the library numbers to check, separated by commas (e.g., 1,3): ")?;
    let selected: Vec<String> = prompt::parse_library_selection(&selection, libraries.len())
        .into_iter()
        .map(|i| libraries[i].section_name.clone())
        .collect();
    if selected.is_empty() {
        warn!("No libraries selected; nothing to process");
        return Ok(None);
    }

    let local_only = prompt::is_affirmative(&prompter.ask(
        "Do you want to filter the results based on local files only? (yes/no): ",
    )?);

    Ok(Some(RunPlan {
        window,
        libraries: selected,
        local_only,
    }))
}

fn archive(
    config: &AppConfig,
    targets: &[PathBuf],
    prompter: &mut dyn Prompter,
) -> anyhow::Result<()> {
    let archiver = Archiver::new(&config.archive);
    let question = format!(
        "Archive {} files into {}?",
        targets.len(),
        archiver.archive_file().display()
    );
    if !prompt::prompt_confirm(prompter, &question, Some(true))? {
        info!("Skipping archive.");
        return Ok(());
    }

    let outcome = archiver
        .archive(targets)
        .with_context(|| format!("writing {}", archiver.archive_file().display()))?;
    info!(
        "Archive finished: {} archived, {} missing, {} duplicate names",
        outcome.archived.len(),
        outcome.missing.len(),
        outcome.duplicates.len()
    );
    Ok(())
}

fn offload(
    config: &AppConfig,
    targets: &[PathBuf],
    remote_dir: &str,
    prompter: &mut dyn Prompter,
) -> anyhow::Result<()> {
    let question = format!(
        "Move {} files to {}:{}?",
        targets.len(),
        config.archive.s3_bucket,
        remote_dir
    );
    if !prompt::prompt_confirm(prompter, &question, Some(false))? {
        info!("Ok. doing nothing.");
        return Ok(());
    }

    let offloader = Offloader::new(&config.archive);
    let outcome = offloader.offload(targets, remote_dir);
    info!(
        "Offload finished: {} uploaded, {} missing, {} failed",
        outcome.uploaded.len(),
        outcome.missing.len(),
        outcome.failed.len()
    );
    if !outcome.uploaded.is_empty() {
        offloader.refresh_cache().context("refreshing rclone cache")?;
    }
    Ok(())
}
