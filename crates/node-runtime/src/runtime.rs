//! # Node Runtime
//!
//! Owns the executor and drives it from a block source.
//!
//! ```text
//! BlockSource ──(reader task)──→ mpsc ──→ apply loop ──→ BlockExecutor
//!                                  ↑                          │
//!                         shutdown (watch)          Arc<RwLock<_>> queries
//! ```
//!
//! The write lock is held for one block at a time, so queries always see
//! state between blocks.

use crate::adapters::BlockSource;
use crate::container::{Managers, NodeConfig};
use crate::error::RuntimeResult;
use crate::handlers::{Block, BlockExecutor, BlockReport};
use parking_lot::RwLock;
use qb_01_keeper::{InMemoryKVStore, Keeper, TracingEventSink};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

pub struct NodeRuntime {
    executor: Arc<RwLock<BlockExecutor>>,
    capacity: usize,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    /// In-memory keeper with the configured constants; events go to the log.
    pub fn new(config: &NodeConfig, managers: Managers) -> Self {
        let keeper = Keeper::new(
            Box::new(InMemoryKVStore::new()),
            Arc::new(TracingEventSink),
            config.constants(),
        );
        let executor = BlockExecutor::new(keeper, managers).with_default_version(config.default_version);
        Self::with_executor(executor, config.channel_capacity)
    }

    pub fn with_executor(executor: BlockExecutor, capacity: usize) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            executor: Arc::new(RwLock::new(executor)),
            capacity: capacity.max(1),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn executor(&self) -> Arc<RwLock<BlockExecutor>> {
        Arc::clone(&self.executor)
    }

    /// Apply every block `source` yields until it runs dry or shutdown is
    /// signalled. Returns the number of blocks applied.
    pub async fn run<S>(&self, source: S) -> RuntimeResult<u64>
    where
        S: BlockSource + 'static,
    {
        let (block_tx, mut block_rx) = mpsc::channel::<RuntimeResult<Block>>(self.capacity);
        let reader = tokio::spawn(read_blocks(source, block_tx, self.shutdown_rx.clone()));

        let mut shutdown = self.shutdown_rx.clone();
        let mut applied = 0u64;
        let outcome = loop {
            if *shutdown.borrow() {
                break Ok(applied);
            }
            tokio::select! {
                next = block_rx.recv() => match next {
                    Some(Ok(block)) => match self.apply(&block) {
                        Ok(_) => applied += 1,
                        Err(e) => break Err(e),
                    },
                    Some(Err(e)) => break Err(e),
                    None => break Ok(applied),
                },
                _ = shutdown.changed() => {
                    info!("[runtime] Shutdown signal received");
                    break Ok(applied);
                }
            }
        };

        reader.abort();
        match &outcome {
            Ok(blocks) => info!(blocks, "[runtime] Block stream finished"),
            Err(e) => error!(error = %e, "[runtime] Block stream stopped"),
        }
        outcome
    }

    fn apply(&self, block: &Block) -> RuntimeResult<BlockReport> {
        self.executor.write().apply_block(block)
    }

    pub fn shutdown(&self) {
        info!("[runtime] Initiating shutdown");
        if self.shutdown_tx.send(true).is_err() {
            warn!("[runtime] No task was listening for shutdown");
        }
    }
}

async fn read_blocks<S: BlockSource>(
    mut source: S,
    blocks: mpsc::Sender<RuntimeResult<Block>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let next = tokio::select! {
            next = source.next_block() => next,
            _ = shutdown.changed() => return,
        };
        let item = match next {
            Ok(Some(block)) => Ok(block),
            Ok(None) => return,
            Err(e) => Err(e),
        };
        let failed = item.is_err();
        if blocks.send(item).await.is_err() || failed {
            return;
        }
    }
}

