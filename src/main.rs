use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use issue_mender::config::Config;
use issue_mender::issues::client::SonarClient;
use issue_mender::llm::client::create_client;
use issue_mender::models::source::SourceFile;
use issue_mender::report;
use issue_mender::stages::fix::{self, CancelFlag};
use log::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short = 'f', long)]
    config_path: Option<String>,

    /// Path to the local checkout of the analyzed repository
    #[arg(short, long)]
    repository_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Fetch issues, assemble context, and generate fixes
    Fix,
    /// Assemble and print the context bundle for one issue without calling
    /// the generation service
    Context {
        /// Issue key to inspect
        #[arg(short, long)]
        issue_key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log level is controlled by RUST_LOG, e.g. RUST_LOG=debug
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::from_file(cli.config_path.as_deref())?;

    if let Some(root) = &cli.repository_root {
        config.context.repository_root = root.clone();
    }

    // Fatal checks happen here, before any issue is touched
    config.validate()?;

    let sonar = SonarClient::new(&config.sonar)?;

    match cli.command {
        Command::Fix => {
            let issues = sonar.search_issues().await?;
            if issues.is_empty() {
                info!("No open issues found for {}", config.sonar.project_key);
                return Ok(());
            }

            let client = create_client(&config.llm)?;
            let cancel = CancelFlag::new();

            // Ctrl-C aborts between issues; recorded results survive
            let cancel_on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, finishing current issue");
                    cancel_on_signal.cancel();
                }
            });

            let summary = fix::run_batch(&config, &issues, client.as_ref(), &cancel).await;

            for result in summary.results.iter().filter(|r| !r.is_fixed()) {
                warn!("{}", report::one_line_summary(result));
            }

            report::write_reports(
                &summary,
                &config.output.json_path,
                &config.output.markdown_path,
            )?;
        }
        Command::Context { issue_key } => {
            let issues = sonar.search_issues().await?;
            let issue = issues
                .iter()
                .find(|i| i.key == issue_key)
                .context(format!("Issue not found: {}", issue_key))?;

            let file_path = issue.file_path().to_string();
            let full_path = config.context.repository_root.join(&file_path);
            // Fall back to the server's raw source when the checkout is
            // missing the flagged file (e.g. analyzing a different revision)
            let content = match std::fs::read_to_string(&full_path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Local read of {:?} failed ({}), fetching raw source", full_path, e);
                    sonar.fetch_raw_source(&issue.component).await?
                }
            };
            let source = SourceFile::new(file_path, content);

            let budget = config.context.budget();
            let bundle = fix::build_context(issue, &source, &budget, &config.context.repository_root);

            println!("Snippet:\n{}", bundle.snippet);
            for file in &bundle.files {
                println!(
                    "{} ({}){}",
                    file.path.display(),
                    file.relation.label(),
                    if file.truncated { " [truncated]" } else { "" }
                );
            }
            println!(
                "~{} tokens{}",
                bundle.total_tokens,
                if bundle.budget_exhausted {
                    ", budget exhausted"
                } else {
                    ""
                }
            );
        }
    }

    Ok(())
}
