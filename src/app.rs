//! Main application orchestration and execution

use crate::{
    cli::{Cli, SessionCommand},
    config::{display_config_summary, load_config, validate_config, EnvManager, ValidationLevel},
    controller::Controller,
    error::{AppError, Result},
    log_debug, log_info, log_warn,
    logging::{ErrorEventLogger, Logger, LoggerFactory},
    models::Config,
    output::{OutputFormatterFactory, StatsFormatter},
};
use std::io::{BufRead, IsTerminal, Write};
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

/// Why the refresh loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Interrupted,
    DurationElapsed,
}

/// What a runtime command did to the session
#[derive(Debug)]
enum CommandOutcome {
    /// A session is now probing this address
    Started(IpAddr),
    Stopped,
    HistoryChanged(f64),
    Usage,
    Rejected(AppError),
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate().map_err(AppError::config)?;
        Ok(Self { cli })
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        if self.cli.env_help {
            println!("{}", EnvManager::display_env_help());
            return Ok(());
        }
        if let Some(ref path) = self.cli.write_example_env {
            EnvManager::save_example_env_file(path)?;
            println!("Wrote example configuration to {}", path.display());
            return Ok(());
        }

        let config = load_config(self.cli.clone())?;
        let formatter = OutputFormatterFactory::create_formatter(&config);

        for warning in validate_config(&config)? {
            if warning.level != ValidationLevel::Info || config.verbose {
                eprintln!("{}", warning.format(config.enable_color));
            }
        }

        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("APP").await;
        let error_logger = factory.create_error_logger().await;
        log_debug!(logger, "Configuration:\n{}", display_config_summary(&config));

        let mut controller = Controller::from_config(&config, factory.create_probe_logger().await);
        let target = match controller.start().await {
            Ok(target) => target,
            Err(e) => {
                error_logger.log_error(&e, Some("starting session"), None).await;
                return Err(e);
            }
        };

        let transport = controller.prober().transport_name();
        println!("{}", formatter.format_header(&config.host, target, transport)?);

        let started = Instant::now();
        let run_for = self.cli.duration.map(Duration::from_secs);
        let mut commands = spawn_stdin_reader();
        let session = Session {
            formatter: formatter.as_ref(),
            logger: &logger,
            error_logger: &error_logger,
            in_place: formatter.is_live() && std::io::stdout().is_terminal(),
        };
        let reason = session.refresh_loop(&mut controller, config.refresh(), run_for, &mut commands).await?;
        log_info!(logger, "Stopping session ({:?})", reason);

        controller.stop().await;
        let last = controller.poll();
        let total_probes = controller.prober().total_probes();
        if !last.stats.has_data() {
            log_warn!(logger, "Session for {} ended without any samples", controller.config().host);
        }

        if session.in_place {
            println!();
        }
        println!(
            "{}",
            formatter.format_final_summary(&last.stats, total_probes, started.elapsed())?
        );

        Ok(())
    }
}

/// Forward stdin lines to the refresh loop.
///
/// A plain thread is used so that a pending read never holds up runtime
/// shutdown. The channel closes at end of input.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Apply one line of runtime input to the controller
async fn apply_command(controller: &mut Controller, line: &str) -> CommandOutcome {
    let command = match line.parse::<SessionCommand>() {
        Ok(command) => command,
        Err(e) => return CommandOutcome::Rejected(e),
    };

    let applied = match command {
        SessionCommand::Host(host) => controller.apply_host(&host).await.map(CommandOutcome::Started),
        SessionCommand::Interval(ms) => controller.apply_interval(ms).await.map(CommandOutcome::Started),
        SessionCommand::History(seconds) => controller
            .apply_history_seconds(seconds)
            .map(|()| CommandOutcome::HistoryChanged(seconds)),
        SessionCommand::Start => controller.start().await.map(CommandOutcome::Started),
        SessionCommand::Stop => {
            controller.stop().await;
            Ok(CommandOutcome::Stopped)
        }
        SessionCommand::Help => Ok(CommandOutcome::Usage),
    };
    applied.unwrap_or_else(CommandOutcome::Rejected)
}

/// Terminal side of a running session
struct Session<'a> {
    formatter: &'a dyn StatsFormatter,
    logger: &'a Logger,
    error_logger: &'a ErrorEventLogger,
    in_place: bool,
}

impl Session<'_> {
    /// Poll the controller on the refresh cadence and apply stdin commands
    /// until Ctrl-C or the optional run duration elapses
    async fn refresh_loop(
        &self,
        controller: &mut Controller,
        refresh: Duration,
        run_for: Option<Duration>,
        commands: &mut mpsc::UnboundedReceiver<String>,
    ) -> Result<StopReason> {
        let mut ticker = tokio::time::interval(refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let deadline = async {
            match run_for {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let interrupted = async {
            // Without a signal handler the session only ends on the deadline
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        tokio::pin!(interrupted);

        let mut stdout = std::io::stdout();
        let mut input_open = true;

        loop {
            tokio::select! {
                _ = &mut interrupted => return Ok(StopReason::Interrupted),
                _ = &mut deadline => return Ok(StopReason::DurationElapsed),
                line = commands.recv(), if input_open => {
                    match line {
                        Some(line) if !line.trim().is_empty() => {
                            let outcome = apply_command(controller, &line).await;
                            self.report(controller, outcome, &mut stdout).await?;
                        }
                        Some(_) => {}
                        None => input_open = false,
                    }
                }
                _ = ticker.tick() => {
                    let changed = controller.has_new_data();
                    // Polling every tick keeps the display scale decaying at the refresh rate
                    let poll = controller.poll();
                    if !changed {
                        continue;
                    }

                    let line = self.formatter.format_poll(&poll)?;
                    if self.in_place {
                        write!(stdout, "\r{}\x1b[K", line)?;
                    } else {
                        writeln!(stdout, "{}", line)?;
                    }
                    stdout.flush()?;
                }
            }
        }
    }

    async fn report(&self, controller: &Controller, outcome: CommandOutcome, stdout: &mut std::io::Stdout) -> Result<()> {
        if self.in_place {
            // finish the live line before anything else is printed
            writeln!(stdout)?;
        }

        match outcome {
            CommandOutcome::Started(target) => {
                let host = &controller.config().host;
                log_info!(self.logger, "Session restarted on {} ({})", host, target);
                let transport = controller.prober().transport_name();
                writeln!(stdout, "{}", self.formatter.format_header(host, target, transport)?)?;
            }
            CommandOutcome::Stopped => {
                eprintln!("{}", self.formatter.format_warning("Probing stopped, type 'start' to resume")?);
            }
            CommandOutcome::HistoryChanged(seconds) => {
                log_info!(self.logger, "History set to {} s", seconds);
            }
            CommandOutcome::Usage => eprintln!("{}", SessionCommand::USAGE),
            CommandOutcome::Rejected(e @ (AppError::Parse(_) | AppError::InvalidConfig(_))) => {
                eprintln!("{}", self.formatter.format_warning(&format!("{}, setting unchanged", e))?);
            }
            CommandOutcome::Rejected(e) => {
                self.error_logger.log_error(&e, Some("applying setting"), None).await;
                let mut text = e.to_string();
                if !controller.is_running() {
                    text.push_str(", probing stopped, type 'start' to resume");
                }
                eprintln!("{}", self.formatter.format_error(&text)?);
            }
        }
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::ProbeLogger;
    use crate::models::SessionConfig;
    use crate::probe::ScriptedTransport;
    use crate::types::ProberState;
    use clap::Parser;
    use std::sync::Arc;

    fn simulated_config() -> Config {
        let cli = Cli::parse_from([
            "pingplot", "--simulate", "--no-color", "--host", "192.0.2.1", "--interval", "10",
        ]);
        crate::config::ConfigParser::new(cli).parse_cli_only().unwrap()
    }

    fn scripted_controller() -> Controller {
        let session = SessionConfig::new("192.0.2.1").with_interval(Duration::from_millis(5));
        Controller::new(session, Arc::new(ScriptedTransport::replies(Duration::from_millis(1))))
    }

    #[test]
    fn test_conflicting_color_flags_rejected() {
        let cli = Cli::parse_from(["pingplot", "--color", "--no-color"]);
        assert!(matches!(App::new(cli), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_simulated_session_runs_for_duration() {
        let config = simulated_config();
        let mut controller = Controller::from_config(&config, ProbeLogger::quiet());
        controller.start().await.unwrap();

        let formatter = OutputFormatterFactory::create_formatter(&config);
        let logger = Logger::with_config("APP", &config);
        let error_logger = ErrorEventLogger::new(&config);
        let session = Session { formatter: formatter.as_ref(), logger: &logger, error_logger: &error_logger, in_place: false };

        let (tx, mut commands) = mpsc::unbounded_channel();
        tx.send("interval 20".to_string()).unwrap();
        drop(tx);

        let reason = session
            .refresh_loop(&mut controller, config.refresh(), Some(Duration::from_millis(150)), &mut commands)
            .await
            .unwrap();
        assert_eq!(reason, StopReason::DurationElapsed);
        assert_eq!(controller.config().interval, Duration::from_millis(20));

        controller.stop().await;
        assert!(!controller.poll().samples.is_empty());
    }

    #[tokio::test]
    async fn test_commands_change_running_session() {
        let mut controller = scripted_controller();
        controller.start().await.unwrap();

        let outcome = apply_command(&mut controller, "interval 20").await;
        assert!(matches!(outcome, CommandOutcome::Started(_)));
        assert_eq!(controller.config().interval, Duration::from_millis(20));

        let outcome = apply_command(&mut controller, "history 30").await;
        assert!(matches!(outcome, CommandOutcome::HistoryChanged(s) if s == 30.0));
        assert_eq!(controller.config().history_seconds, 30.0);

        let outcome = apply_command(&mut controller, "host 192.0.2.77").await;
        assert!(matches!(outcome, CommandOutcome::Started(ip) if ip == IpAddr::from([192, 0, 2, 77])));

        assert!(matches!(apply_command(&mut controller, "help").await, CommandOutcome::Usage));
        assert!(controller.is_running());

        assert!(matches!(apply_command(&mut controller, "stop").await, CommandOutcome::Stopped));
        assert_eq!(controller.prober().state(), ProberState::Idle);
        assert!(matches!(apply_command(&mut controller, "start").await, CommandOutcome::Started(_)));
        assert!(controller.is_running());
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_rejected_commands_keep_previous_settings() {
        let mut controller = scripted_controller();
        controller.start().await.unwrap();

        for line in ["interval 20000", "interval -1", "history 0.5", "history 301", "host  ", "faster"] {
            let outcome = apply_command(&mut controller, line).await;
            assert!(
                matches!(outcome, CommandOutcome::Rejected(AppError::InvalidConfig(_) | AppError::Parse(_))),
                "{:?} gave {:?}",
                line,
                outcome
            );
        }
        assert_eq!(controller.config().interval, Duration::from_millis(5));
        assert_eq!(controller.config().history_seconds, 15.0);
        assert!(controller.is_running());

        // a host that cannot be resolved is reverted and leaves probing stopped
        let outcome = apply_command(&mut controller, "host no.such.host.invalid").await;
        assert!(matches!(outcome, CommandOutcome::Rejected(AppError::Resolution(_))));
        assert_eq!(controller.config().host, "192.0.2.1");
        assert!(!controller.is_running());
    }
}
