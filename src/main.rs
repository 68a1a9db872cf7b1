//! PingPlot - Main CLI Application
//!
//! Probes one host continuously and prints a live latency readout until
//! interrupted.

use clap::Parser;
use pingplot::{
    app::App,
    cli::Cli,
    config::EnvManager,
    error::{AppError, ErrorReporter, Result},
    PKG_NAME, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{} v{}", PKG_NAME, VERSION);
        eprintln!(
            "Built {} from {} for {}",
            option_env!("BUILD_TIME").unwrap_or("unknown"),
            option_env!("GIT_COMMIT").unwrap_or("unknown"),
            option_env!("TARGET_TRIPLE").unwrap_or("unknown"),
        );
        eprintln!("{}", cli.get_config_summary());
        for problem in EnvManager::validate_current_env() {
            eprintln!("{}", problem);
        }
    }

    App::new(cli)?.run().await
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::InvalidConfig(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format (see --env-help)");
            eprintln!("  - Interval must be 0-10000 ms, history 1-300 s");
            eprintln!("  - Timeout must be 1-10000 ms");
        }
        AppError::Resolution(_) => {
            eprintln!();
            eprintln!("Resolution help:");
            eprintln!("  - Check that the host name is spelled correctly");
            eprintln!("  - Try probing an IP address directly");
        }
        AppError::Resource(_) => {
            eprintln!();
            eprintln!("Socket help:");
            eprintln!("  - ICMP sockets may need elevated privileges");
            eprintln!("  - On Linux, check net.ipv4.ping_group_range");
            eprintln!("  - Use --simulate to run without sending packets");
        }
        _ => {}
    }
}
