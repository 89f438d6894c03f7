use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::connect;
use crate::cache::CacheManager;
use crate::cli::RelayArgs;
use crate::config::{ConfigFile, ResolveOptions, ResolvedConfig, resolve_config};
use crate::relay::demo::run_demo;
use crate::relay::{PollingLoop, RelayStats, SourceRoom, TranslationRouter, Translator};
use crate::translation::{CachedTranslator, TranslationClient};

/// Runs one polling loop per source room until Ctrl-C or the iteration
/// limit.
pub async fn run_relay(config: &ConfigFile, args: RelayArgs) -> Result<()> {
    let spark = Arc::new(connect(config)?);

    let options = ResolveOptions {
        provider: args.provider,
        model: args.model,
        interval_secs: args.interval,
        iterations: args.iterations,
        concurrency: args.concurrency,
    };
    let resolved = resolve_config(&options, config)?;
    let translator = build_translator(&resolved, args.no_cache)?;

    info!(
        provider = %resolved.provider_name,
        model = %resolved.model,
        concurrency = resolved.concurrency,
        interval_secs = resolved.relay.interval.as_secs(),
        "Starting relay"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut loops = JoinSet::new();
    let mut demos = JoinSet::new();

    for title in args.titles {
        let Some(room_id) = spark.find_room_id_by_title(&title).await? else {
            bail!("Room '{title}' not found");
        };

        let router = TranslationRouter::new(Arc::clone(&translator), spark.clone())
            .with_concurrency(resolved.concurrency);
        let room = SourceRoom {
            id: room_id.clone(),
            title: title.clone(),
        };
        let mut relay = PollingLoop::new(
            room,
            spark.clone(),
            spark.clone(),
            router,
            resolved.relay.clone(),
            shutdown_rx.clone(),
        );
        loops.spawn(async move { (title, relay.run().await) });

        if args.demo {
            demos.spawn(run_demo(
                spark.clone(),
                room_id,
                resolved.relay.interval,
                shutdown_rx.clone(),
            ));
        }
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stopping = false;

    while !loops.is_empty() {
        tokio::select! {
            result = &mut ctrl_c, if !stopping => {
                if let Err(err) = result {
                    warn!(error = %err, "Failed to listen for Ctrl-C");
                }
                info!("Stop requested, finishing in-flight batches");
                stopping = true;
                let _ = shutdown_tx.send(true);
            }
            Some(joined) = loops.join_next() => match joined {
                Ok((title, stats)) => report(&title, stats),
                Err(err) => error!(error = %err, "Relay task failed"),
            },
        }
    }

    let _ = shutdown_tx.send(true);
    while let Some(joined) = demos.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %format!("{err:#}"), "Demo stopped early"),
            Err(err) => error!(error = %err, "Demo task failed"),
        }
    }

    Ok(())
}

fn build_translator(resolved: &ResolvedConfig, no_cache: bool) -> Result<Arc<dyn Translator>> {
    let client = TranslationClient::new(
        resolved.endpoint.clone(),
        resolved.api_key.clone(),
        resolved.model.clone(),
    );

    if no_cache {
        return Ok(Arc::new(client));
    }

    let cache = CacheManager::new().context("Failed to open translation cache")?;
    info!(path = %cache.db_path().display(), "Using translation cache");
    Ok(Arc::new(CachedTranslator::new(client, cache)))
}

fn report(title: &str, stats: RelayStats) {
    info!(
        room = %title,
        iterations = stats.iterations,
        messages = stats.messages_seen,
        commands = stats.commands_applied,
        routed = stats.messages_routed,
        deliveries = stats.deliveries,
        failures = stats.failures,
        skipped = stats.skipped_iterations,
        "Relay finished"
    );
}
