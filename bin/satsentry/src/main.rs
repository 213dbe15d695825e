//! `satsentry` watches bitcoin addresses and the receive chains of extended public keys, keeping
//! each chain topped up to its gap limit and reporting new transactions.

use std::{fs, path::Path, process, sync::Arc};

use anyhow::Context;
use args::{Cli, Command};
use clap::Parser;
use config::Config;
use constants::{COMMAND_CHANNEL_CAPACITY, DEFAULT_THREAD_COUNT};
use monitor::Monitor;
use satsentry_common::{logging, logging::LoggerConfig};
use satsentry_db::persistent::{config::JsonDbConfig, JsonFileDb};
use satsentry_gap_limit::MaintainerConfig;
use satsentry_key_deriv::{addresses_for_range, parse};
use satsentry_mempool_client::MempoolClient;
use scheduler::{Scheduler, SchedulerCommand};
use serde::de::DeserializeOwned;
use tokio::{runtime, sync::mpsc};
use tracing::{debug, error, info, trace, warn};

mod args;
mod config;
mod monitor;
mod scheduler;

mod constants;

fn main() {
    logging::init(LoggerConfig::with_base_name("satsentry"));

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let config = parse_toml::<Config>(&cli.config);
            watch(config)
        }
        Command::Derive {
            key,
            change,
            start,
            count,
        } => derive(&key, change, start, count),
        Command::Validate { key } => validate(&key),
    };

    if let Err(e) = result {
        error!(?e, "satsentry failed");
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn derive(key: &str, change: bool, start: u32, count: u32) -> anyhow::Result<()> {
    let key = parse(key).context("invalid extended public key")?;
    let addresses = addresses_for_range(&key, change, start, count)?;

    for (index, address) in addresses {
        println!("{index}\t{address}");
    }

    Ok(())
}

fn validate(key: &str) -> anyhow::Result<()> {
    let key = parse(key).context("invalid extended public key")?;

    println!(
        "valid {} key: purpose {}, account path {}, depth {}",
        key.family,
        key.family.purpose(),
        key.family.default_account_path(),
        key.depth
    );

    Ok(())
}

fn watch(config: Config) -> anyhow::Result<()> {
    let runtime = runtime::Builder::new_multi_thread()
        .worker_threads(DEFAULT_THREAD_COUNT)
        .enable_all()
        .build()
        .expect("must be able to create runtime");

    runtime.block_on(bootstrap(config))?;

    info!("satsentry shutdown complete");
    Ok(())
}

async fn bootstrap(config: Config) -> anyhow::Result<()> {
    let db = JsonFileDb::open(JsonDbConfig::new(&config.datadir))
        .await
        .context("could not open database")?;
    let client = MempoolClient::new(&config.explorer).context("could not build http client")?;

    match client.tip_height().await {
        Ok(height) => info!(api_url = %client.api_url(), height, "explorer reachable"),
        Err(e) => warn!(api_url = %client.api_url(), %e, "explorer unreachable, continuing"),
    }

    let activity_timeout = config.activity_timeout();
    if activity_timeout.as_secs() > config.activity_timeout {
        warn!(
            configured = config.activity_timeout,
            ?activity_timeout,
            "activity timeout raised to the minimum"
        );
    }
    let maintainer_config = MaintainerConfig::default().with_activity_timeout(activity_timeout);
    let monitor = Arc::new(Monitor::new(client, db, maintainer_config));

    for entry in &config.addresses {
        if let Err(e) = monitor.register_address(&entry.address, &entry.label).await {
            error!(address = %entry.address, ?e, "skipping configured address");
        }
    }

    for entry in &config.extended_keys {
        let path_config = entry.path_config(&config.defaults);
        match monitor
            .register_extended_key(&entry.key, entry.derivation_path.as_deref(), path_config)
            .await
        {
            Ok(Some(id)) => info!(%id, label = %entry.label, "tracking extended key"),
            Ok(None) => {}
            Err(e) => error!(label = %entry.label, ?e, "skipping configured extended key"),
        }
    }

    let interval = config.check_interval();
    if interval.as_secs() > config.check_interval {
        warn!(
            configured = config.check_interval,
            ?interval,
            "check interval raised to the minimum"
        );
    }

    let (commands, receiver) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    spawn_signal_listeners(commands);

    info!(?interval, "starting monitoring loop");
    let scheduler = scheduler::run(Scheduler::new(interval), receiver, || {
        let monitor = monitor.clone();
        async move {
            if let Err(e) = monitor.check_all().await {
                error!(?e, "monitoring pass failed");
            }
        }
    })
    .await;

    info!(
        state = ?scheduler.state(),
        last_check = ?scheduler.last_check(),
        "monitoring loop finished"
    );

    Ok(())
}

/// Ctrl-C stops the watcher. On unix, SIGHUP triggers a pass and SIGUSR1/SIGUSR2 pause and resume
/// the schedule.
fn spawn_signal_listeners(commands: mpsc::Sender<SchedulerCommand>) {
    let stop = commands.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c, stopping");
            let _ = stop.send(SchedulerCommand::Stop).await;
        }
    });

    #[cfg(unix)]
    tokio::spawn(forward_unix_signals(commands));
}

#[cfg(unix)]
async fn forward_unix_signals(commands: mpsc::Sender<SchedulerCommand>) {
    use tokio::signal::unix::{signal, SignalKind};

    let (Ok(mut hangup), Ok(mut usr1), Ok(mut usr2)) = (
        signal(SignalKind::hangup()),
        signal(SignalKind::user_defined1()),
        signal(SignalKind::user_defined2()),
    ) else {
        warn!("could not install signal handlers");
        return;
    };

    loop {
        let command = tokio::select! {
            _ = hangup.recv() => SchedulerCommand::CheckNow,
            _ = usr1.recv() => SchedulerCommand::Pause,
            _ = usr2.recv() => SchedulerCommand::Resume,
        };
        if commands.send(command).await.is_err() {
            break;
        }
    }
}

/// Reads and parses a TOML file from the given path into the given type `T`.
///
/// # Panics
///
/// 1. If the file is not readable.
/// 2. If the contents of the file cannot be deserialized into the given type `T`.
fn parse_toml<T>(path: impl AsRef<Path>) -> T
where
    T: std::fmt::Debug + DeserializeOwned,
{
    fs::read_to_string(path)
        .map(|p| {
            trace!(?p, "read file");

            let parsed = toml::from_str::<T>(&p).unwrap_or_else(|e| {
                panic!("failed to parse TOML file: {e:?}");
            });
            debug!(?parsed, "parsed TOML file");

            parsed
        })
        .unwrap_or_else(|_| {
            panic!("failed to read TOML file");
        })
}
