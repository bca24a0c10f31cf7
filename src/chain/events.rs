//! Swap-event watcher.
//!
//! Polls a log filter over every monitored pool and turns each matching
//! log into an explicit [`SwapSignal`] carrying the pair identity. The
//! pipeline consumes signals from the channel; nothing here captures
//! venue or token state in closures.

use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::Filter;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{BotError, ChainError};
use crate::venue::{PairRegistry, SwapSignal};

/// Swap event signature shared by Uniswap V3 and Algebra pools.
const SWAP_EVENT: &str = "Swap(address,address,int256,int256,uint160,uint128,int24)";

/// Watch all monitored pools for swap events until the channel closes.
pub async fn watch_swaps(
    provider: DynProvider,
    registry: &PairRegistry,
    tx: mpsc::Sender<SwapSignal>,
) -> Result<(), BotError> {
    let addresses = registry.pool_addresses();
    info!(pools = addresses.len(), "Watching pools for swap events");

    let filter = Filter::new().address(addresses).event(SWAP_EVENT);

    let poller = provider
        .watch_logs(&filter)
        .await
        .map_err(|e| ChainError::Rpc(e.to_string()))?;

    let mut stream = poller.into_stream().flat_map(futures::stream::iter);

    while let Some(log) = stream.next().await {
        let Some((pair, venue)) = registry.pair_by_pool(log.address()) else {
            warn!(address = %log.address(), "Swap log from unknown pool");
            continue;
        };

        debug!(pair = %pair.name, venue = %venue, "Swap event");

        if tx.send(SwapSignal { pair, venue }).await.is_err() {
            // Receiver dropped: the bot is shutting down.
            break;
        }
    }

    Ok(())
}
