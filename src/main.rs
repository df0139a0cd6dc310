use flightdesk::cli::{ChatSession, CliArgs};
use flightdesk::diagnostics::{DiagnosticSink, StderrSink, TracingSink};
use flightdesk::util::{init_logging, LoggingConfig};
use flightdesk::{FlightdeskConfig, VERSION};

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("flightdesk v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match run(&args).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(args: &CliArgs) -> Result<()> {
    let mut config = FlightdeskConfig::default();
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;
    debug!("{}", config);

    let sink: Arc<dyn DiagnosticSink> = if args.show_raw {
        Arc::new(StderrSink)
    } else {
        Arc::new(TracingSink)
    };

    let chat = config
        .create_orchestrator_with_sink(sink)
        .context("Failed to set up the chat client")?;
    info!(
        model = %config.model,
        tools_enabled = config.tools_enabled,
        "Chat session ready"
    );

    let mut session = ChatSession::new(chat);
    let mut stdout = tokio::io::stdout();
    session
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await
        .context("Console I/O failed")?;

    Ok(())
}
