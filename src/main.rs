//! kubectl-history - kubectl plugin for workload revision history
//!
//! Installed as `kubectl-history` on the PATH and invoked as
//! `kubectl history <command>`.

use kubectl_history::cli::args::{Cli, Commands};
use kubectl_history::cli::output::IoStreams;
use kubectl_history::cli::root;
use kubectl_history::cluster::warnings::allows_color_output;
use kubectl_history::cluster::KubeClient;
use kubectl_history::commands::{run_diff, run_get, run_version};
use kubectl_history::config::{ConfigBuilder, EXTERNAL_DIFF_ENV};
use kubectl_history::error::{AppError, ClusterError, DomainError};
use kubectl_history::services::DiffService;
use std::io;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = root::parse();

    // Initialize logging
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = cli.log_level() {
        logger.filter_level(level);
    }
    logger.format_timestamp(None).init();

    // Run the appropriate command
    let result = run(&cli).await;

    if let Err(e) = result {
        // Reader went away, e.g. `kubectl history get deploy web | head -1`
        if e.is_broken_pipe() {
            return;
        }
        log::debug!("{:?}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    root::install_warning_handler();

    let mut out = io::stdout();
    let mut err_out = io::stderr();

    match &cli.command {
        Commands::Version => run_version(&mut out),

        Commands::Completion { shell } => {
            root::generate_completions(*shell, &mut out);
            Ok(())
        }

        Commands::Get(args) => {
            let config = config_builder(cli)?
                .with_output_format(args.output)
                .build();
            let client = KubeClient::connect(&cli.config_flags).await?;

            let mut streams = IoStreams::new(&mut out, &mut err_out);
            run_get(&client, args, config.output.format, &mut streams).await
        }

        Commands::Diff(args) => {
            let config = config_builder(cli)?
                .with_color(args.color)
                .with_context_lines(args.context_lines)
                .build();
            let color = config.output.color.enabled(allows_color_output(&io::stdout()));
            let service = DiffService::new(config.diff.context_lines, color)
                .with_external(config.diff.external);
            let client = KubeClient::connect(&cli.config_flags).await?;

            let mut streams = IoStreams::new(&mut out, &mut err_out);
            run_diff(&client, args, &service, &mut streams).await
        }
    }
}

fn config_builder(cli: &Cli) -> Result<ConfigBuilder, AppError> {
    Ok(ConfigBuilder::new()
        .with_file(cli.history_config.as_deref())?
        .with_external_diff(std::env::var(EXTERNAL_DIFF_ENV).ok()))
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Cluster(ClusterError::Kubeconfig(_)) => {
            eprintln!();
            eprintln!("Hint: Set KUBECONFIG or pass --kubeconfig to select a cluster.");
        }
        AppError::Cluster(ClusterError::NotFound { .. }) => {
            eprintln!();
            eprintln!("Hint: Check the namespace with -n/--namespace.");
        }
        AppError::Domain(DomainError::UnsupportedKind(_)) => {
            eprintln!();
            eprintln!("Hint: Revision history is kept for deployments, statefulsets and daemonsets.");
        }
        AppError::Domain(DomainError::RevisionNotFound { .. })
        | AppError::Domain(DomainError::NoPredecessor(_)) => {
            eprintln!();
            eprintln!("Hint: Run 'kubectl history get TYPE NAME' to list the available revisions.");
        }
        _ => {}
    }
}
