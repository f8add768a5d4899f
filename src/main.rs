use wechat_ir::{config::Config, diagnostics::LogSink, ir::Ir, translate_file};

use anyhow::Context;
use log::{error, info};
use std::env;
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let (config_path, bills) = parse_args();
    for bill in &bills {
        validate_csv_file(bill);
    }

    let config = Config::load(&config_path)
        .with_context(|| format!("can't load config {}", config_path.display()))?;
    let failed = process_bills(config, bills).await?;

    if failed > 0 {
        anyhow::bail!("{} bill(s) failed to translate", failed);
    }
    Ok(())
}

fn parse_args() -> (PathBuf, Vec<PathBuf>) {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <config.toml> <bill.csv>...", args[0]);
        eprintln!("  config.toml: owner mapping and error policy");
        eprintln!("  bill.csv: exported WeChat Pay bill, one run per file");
        std::process::exit(1);
    }

    let config = PathBuf::from(&args[1]);
    let bills = args[2..].iter().map(PathBuf::from).collect();
    (config, bills)
}

fn validate_csv_file(path: &Path) {
    if !path.exists() {
        eprintln!("Error: File '{}' does not exist", path.display());
        std::process::exit(1);
    }

    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        eprintln!("Error: File '{}' is not a CSV file", path.display());
        std::process::exit(1);
    }
}

/// Translates every bill on its own blocking task and prints finished IRs
/// as they arrive. Returns how many bills failed.
async fn process_bills(config: Config, bills: Vec<PathBuf>) -> anyhow::Result<usize> {
    let mapping = Arc::new(config.owner_mapping().context("invalid owner mapping")?);
    let policy = config.wechat.error_policy;

    let (ir_channel, mut rx) = mpsc::channel::<(PathBuf, Ir)>(16);

    let writer = tokio::spawn(async move {
        let mut out = stdout();
        let mut failed: usize = 0;
        while let Some((path, ir)) = rx.recv().await {
            info!("Finished to parse the file {}", path.display());
            if let Err(e) = write_ir(&mut out, &ir) {
                error!("can't write IR for {}: {}", path.display(), e);
                failed += 1;
            }
        }
        failed
    });

    let mut runs = Vec::with_capacity(bills.len());
    for path in bills {
        let mapping = Arc::clone(&mapping);
        let ir_channel = ir_channel.clone();
        runs.push(tokio::task::spawn_blocking(move || {
            match translate_file(&path, &mapping, policy, LogSink) {
                Ok(ir) => match ir_channel.blocking_send((path, ir)) {
                    Ok(()) => true,
                    Err(mpsc::error::SendError((path, _))) => {
                        error!(
                            "{}: IR writer stopped before the bill was written",
                            path.display()
                        );
                        false
                    }
                },
                Err(e) => {
                    error!("{}: {}", path.display(), e);
                    false
                }
            }
        }));
    }
    drop(ir_channel);

    let mut failed = 0;
    for run in runs {
        if !run.await? {
            failed += 1;
        }
    }
    failed += writer.await?;

    Ok(failed)
}

fn write_ir<W: Write>(mut out: W, ir: &Ir) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(ir)?;
    writeln!(out, "{}", json)?;
    out.flush()?;
    Ok(())
}
