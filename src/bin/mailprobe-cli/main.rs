mod args;
mod output;
mod send;
mod status;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use mailprobe_lib::{DeliverabilityTester, EmailSender, MailerConfig, SendResult};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            // --help / --version print to stdout and succeed
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    // .env may carry RUST_LOG
    dotenv::dotenv().ok();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(io::stderr)
        .init();
}

/// `RUST_LOG` when set, otherwise a level picked from `-v`.
fn log_filter(verbose: u8) -> EnvFilter {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn load_config(cli: &Cli) -> Result<MailerConfig> {
    MailerConfig::from_env()
        .context("read mail settings from environment")?
        .with_smtp_overrides(cli.smtp.overrides())
        .context("apply --smtp-* flags")
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    debug!(?config, "configuration resolved");

    match &cli.cmd {
        Some(Commands::Send(send_args)) => {
            let sender = EmailSender::new(config).context("set up delivery backends")?;
            let result = send::run(&sender, send_args).await?;
            write_send_result(&result, &cli.format, cli.out.as_deref())?;
            return Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Some(Commands::Status) => {
            let sender = EmailSender::new(config).context("set up delivery backends")?;
            let config_status = sender.config_status();
            let report = sender.test_connection().await;
            match cli.format.as_str() {
                #[cfg(feature = "with-serde")]
                "json" | "ndjson" => output::write_json(
                    &status::StatusReport {
                        config: &config_status,
                        connections: &report,
                    },
                    cli.out.as_deref(),
                )?,
                "human" => output::write_text(&status::render(&config_status, &report), cli.out.as_deref())?,
                other => bail!("unknown --format '{other}' for status, use: human|json"),
            }
            return Ok(ExitCode::SUCCESS);
        }
        None => {}
    }

    let mut emails = cli.listed_emails();
    if cli.stdin {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("read stdin")? {
            let line = line.trim();
            if !line.is_empty() {
                emails.push(line.to_string());
            }
        }
    }
    if emails.is_empty() {
        eprintln!("error: give at least one address with --email, --emails or --stdin\n");
        eprintln!("{}", Cli::clap_command().render_help());
        return Ok(ExitCode::FAILURE);
    }

    let options = cli.test_options()?;
    let tester = DeliverabilityTester::new(&config).context("set up delivery backends")?;
    let items = emails
        .into_iter()
        .map(|email| mailprobe_lib::BatchItem::new(email, options.clone()))
        .collect();
    let batch = tester.run_batch(items).await;
    info!(
        total = batch.total,
        deliverable = batch.success,
        duration_ms = batch.duration_ms,
        "addresses tested"
    );

    output::write_reports(&batch.results, &cli)?;
    Ok(ExitCode::SUCCESS)
}

fn write_send_result(result: &SendResult, format: &str, out: Option<&str>) -> Result<()> {
    match format {
        "human" => output::write_text(&format!("{}\n", output::delivery_summary(result)), out),
        "json" | "ndjson" => output::write_json(result, out),
        other => bail!("unknown --format '{other}' for send, use: human|json|ndjson"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_from_dotenv_drives_the_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(log_filter(1).to_string().contains("info"));

        let dir = std::env::temp_dir().join(format!("mailprobe-dotenv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        std::fs::write(&path, "RUST_LOG=mailprobe_lib=trace\n").unwrap();

        dotenv::from_path(&path).unwrap();
        assert!(log_filter(0).to_string().contains("mailprobe_lib=trace"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn send_rejects_csv_and_unknown_formats() {
        let result = SendResult::unrouted("no sender");
        let err = write_send_result(&result, "csv", None).unwrap_err();
        assert!(err.to_string().contains("unknown --format 'csv'"));
        assert!(write_send_result(&result, "yaml", None).is_err());
    }

    #[test]
    fn send_writes_human_summary_to_file() {
        let dir = std::env::temp_dir().join(format!("mailprobe-send-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("send.txt");
        let path = path.to_str().unwrap();

        write_send_result(&SendResult::unrouted("no sender"), "human", Some(path)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "- failed: no sender\n");
        std::fs::remove_dir_all(&dir).ok();
    }
}
