//! # Shard-Chain Node
//!
//! Entry point for the Shard-Chain prototype.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging from `SC_LOG_LEVEL` / `SC_JSON_LOGS`
//! 2. Load and validate `ProtocolConfig` from `SC_*` variables
//! 3. Load the simulation parameters (`SC_SIM_*`)
//! 4. Run the simulation and print its summary as JSON

mod simulation;

use anyhow::Result;
use sc_telemetry::{init_logging, TelemetryConfig};
use shared_types::ProtocolConfig;
use simulation::{Simulation, SimulationConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&TelemetryConfig::for_service("sc-node"))?;

    let protocol = ProtocolConfig::from_env();
    protocol.validate()?;
    let config = SimulationConfig::from_env();

    info!(
        "[sc-node] Starting: {} shards, period {} blocks, {} validators, {} periods",
        protocol.shard_count, protocol.period_length, config.validators, config.periods
    );

    let summary = Simulation::new(protocol, config)?.run().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
