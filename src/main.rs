use anyhow::{bail, Context};
use env_logger::{Builder, Env, Target};
use fsmcp::cli::Cli;
use fsmcp::metrics::Metrics;
use fsmcp::{server, AllowedDirectories, Config, Parser, ToolContext};
use log::info;
use std::fs;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let start_time = Instant::now();
    let config = Config::load(cli.config.as_deref())?;

    let dirs = if cli.allowed_dirs.is_empty() {
        config.server.allowed_directories.clone()
    } else {
        cli.allowed_dirs.clone()
    };
    if dirs.is_empty() {
        bail!("no allowed directories given; pass at least one directory or set server.allowed_directories");
    }
    let allowed = AllowedDirectories::canonicalize(&dirs)
        .context("Failed to resolve allowed directories")?;

    let ctx = ToolContext::new(allowed, config, Arc::new(Metrics::new()));
    server::run_stdio(ctx).await?;

    info!(
        "Server finished. Total elapsed time: {:.2?}",
        start_time.elapsed()
    );
    Ok(())
}

fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    // stdout carries the RPC stream, so logs never go there
    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder.try_init()?;
    Ok(())
}
