//! CLI command implementations
//!
//! Boot order for `run`: config, logger level, sink, Discord identity,
//! fetcher, driver. Nothing touches the network before the configuration is
//! valid.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::config::BotConfig;
use crate::discord::{DisconnectNotifier, DiscordPublisher};
use crate::lifecycle::{install_panic_hook, wait_for_shutdown, BotClock};
use crate::notify::{create_notification_sink, deliver, LifecycleNotice};
use crate::observability::{
    log_event, log_event_with_fields, log_metrics, Event, Logger, MetricsRegistry,
};
use crate::poller::{Collaborators, PollDriver, TickOutcome};
use crate::status::CfxStatusFetcher;

use super::args::{Cli, Command, RunArgs};
use super::errors::{CliError, CliResult};

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> CliResult<()> {
    match cli.into_command() {
        Command::Run(args) => run_bot(args).await,
        Command::CheckConfig { env_file } => check_config(env_file.as_deref()),
    }
}

/// Load configuration, logging `CONFIG_INVALID` on failure
fn load_config(env_file: Option<&Path>) -> CliResult<BotConfig> {
    BotConfig::load(env_file).map_err(|e| {
        log_event_with_fields(
            Event::ConfigInvalid,
            &[("code", e.code_str()), ("reason", e.message())],
        );
        e
    })
}

/// `check-config`: print the redacted configuration
pub fn check_config(env_file: Option<&Path>) -> CliResult<()> {
    let config = load_config(env_file)?;
    println!("{}", serde_json::to_string_pretty(&config.summary())?);
    Ok(())
}

/// `run`: the bot itself
pub async fn run_bot(args: RunArgs) -> CliResult<()> {
    install_panic_hook();
    log_event(Event::BootStart);

    let config = load_config(args.env_file.as_deref())?;
    Logger::set_min_severity(config.log_level);

    let interval = config.poll_interval_secs.to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("channel_id", config.channel_id.as_str()),
            ("interval_secs", interval.as_str()),
            ("server_id", config.server_id.as_str()),
            (
                "webhook",
                if config.webhook_url.is_some() { "configured" } else { "disabled" },
            ),
        ],
    );

    let clock = BotClock::start();
    let metrics = Arc::new(MetricsRegistry::new());
    let sink = create_notification_sink(config.webhook_url.as_deref(), &config.server_name);

    let notifier = (!args.once).then(|| DisconnectNotifier {
        sink: Arc::clone(&sink),
        server_name: config.server_name.clone(),
        clock,
        metrics: Arc::clone(&metrics),
    });
    let publisher = DiscordPublisher::connect(config.discord_config(), notifier)
        .await
        .map(Arc::new)
        .map_err(|e| CliError::boot_failed(format!("Discord login failed: {}", e)))?;

    let fetcher = CfxStatusFetcher::new(config.fetcher_config())
        .map_err(|e| CliError::boot_failed(format!("Status client setup failed: {}", e)))?;

    let driver = PollDriver::new(
        Collaborators {
            source: Arc::new(fetcher),
            overrides: Arc::new(config.marker_store()),
            publisher: publisher.clone(),
            sink: Arc::clone(&sink),
        },
        config.branding(),
        config.poll_interval(),
        Arc::clone(&metrics),
    )
    .with_startup_notice(!args.once);

    log_event_with_fields(
        Event::BootComplete,
        &[("bot_user", publisher.bot_user().username.as_str())],
    );

    if args.once {
        let outcome = driver.tick().await;
        publisher.close().await;
        log_metrics(&metrics.snapshot());
        return match outcome {
            TickOutcome::Failed(reason) => Err(CliError::boot_failed(format!(
                "Cycle failed: {}",
                reason
            ))),
            _ => Ok(()),
        };
    }

    let signal = driver.run_until(wait_for_shutdown()).await;
    log_event_with_fields(Event::ShutdownStart, &[("signal", signal.as_str())]);

    // A released session sends no disconnect notice
    publisher.close().await;

    let notice = LifecycleNotice::Shutdown {
        signal,
        bot_uptime: clock.uptime(),
        at: Utc::now(),
    };
    deliver(
        sink.as_ref(),
        &notice.to_notice(&config.server_name),
        notice.as_str(),
        &metrics,
    )
    .await;

    log_metrics(&metrics.snapshot());
    log_event(Event::ShutdownComplete);
    Ok(())
}
