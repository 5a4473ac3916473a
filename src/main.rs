/*!
 * Memory Inflator - Main Entry Point
 *
 * Inflates this process to a configured size, logs progress and status,
 * and releases everything on Ctrl+C.
 */

use anyhow::Context;
use mem_inflator::{
    init_tracing_with, HostIntrospector, InflationEngine, InflationService, MemoryIntrospector,
    ServiceConfig,
};
use tracing::{info, warn};

#[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("invalid inflator configuration")?;
    init_tracing_with(config.trace_json);

    info!("Memory inflator starting...");

    let introspector = HostIntrospector::detect();
    let initial = introspector.memory_report(std::process::id());
    info!(
        platform = %introspector.platform(),
        own_mb = initial.own_mb(),
        subtree_mb = initial.subtree_mb(),
        container_mb = ?initial.container_mb(),
        "Initial memory footprint"
    );

    let engine = InflationEngine::new(introspector).with_config(config.engine.clone());
    let service = InflationService::new(engine);

    match config.target_mb {
        Some(target_mb) => {
            service
                .start_inflation(target_mb, config.step_mb)
                .context("could not start inflation")?;
        }
        None => info!("No target configured, idling"),
    }

    info!("Press Ctrl+C to release memory and exit");
    let mut ticker = tokio::time::interval(config.status_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let status = service.get_status();
                info!(
                    allocated_mb = status.allocated_mb,
                    block_count = status.block_count,
                    "Inflator status"
                );
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl+C, shutting down");
                }
                break;
            }
        }
    }

    let reset = service.reset();
    info!(allocated_mb = reset.allocated_mb, "Memory released, exiting");
    Ok(())
}
