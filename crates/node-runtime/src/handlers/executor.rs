//! # Block Executor
//!
//! Applies blocks to the keeper one message at a time.
//!
//! ```text
//! begin_block(height, version)
//!     │  resolve HandlerStrategy, purge operational votes on churn
//!     ↓
//! deliver(msg) × N ──→ keeper.begin() → handle → commit | discard
//!     ↓
//! end_block() ──→ gas refresh + dangling requeue (own write-set)
//! ```
//!
//! A failed message leaves no trace in state: its write-set is discarded
//! and the failure is reported in its [`DeliverResult`].

use crate::container::Managers;
use crate::error::{RuntimeError, RuntimeResult};
use crate::handlers::msg::{Block, BridgeMsg};
use crate::handlers::strategy::{HandlerStrategy, ProtocolVersion};
use qb_01_keeper::Keeper;
use qb_04_outbound::EndBlockReport;
use qb_05_governance::{BanClaim, ErrataClaim, MimirVote, SolvencyClaim};
use qb_telemetry::metrics as telemetry;
use qb_telemetry::{log_block_event, log_event};
use shared_types::{NodeAddress, TxOut, Vault};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Outcome of one delivered message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliverResult {
    pub kind: &'static str,
    pub ok: bool,
    /// What happened, or why the message was rejected.
    pub log: String,
    /// Events published by the commit.
    pub events: usize,
}

/// Outcome of one applied block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockReport {
    pub height: u64,
    pub results: Vec<DeliverResult>,
    pub end_block: EndBlockReport,
}

impl BlockReport {
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.ok).count()
    }
}

pub struct BlockExecutor {
    keeper: Keeper,
    managers: Managers,
    default_version: ProtocolVersion,
    strategy: Option<HandlerStrategy>,
    last_height: Option<u64>,
    active_set: Option<BTreeSet<NodeAddress>>,
}

impl BlockExecutor {
    pub fn new(keeper: Keeper, managers: Managers) -> Self {
        let last_height = match keeper.block_height() {
            0 => None,
            height => Some(height),
        };
        Self {
            keeper,
            managers,
            default_version: ProtocolVersion::MINIMUM,
            strategy: None,
            last_height,
            active_set: None,
        }
    }

    /// Version applied to blocks that do not name one.
    pub fn with_default_version(mut self, version: ProtocolVersion) -> Self {
        self.default_version = version;
        self
    }

    pub fn keeper(&self) -> &Keeper {
        &self.keeper
    }

    /// Direct state access for seeding genesis state.
    pub fn keeper_mut(&mut self) -> &mut Keeper {
        &mut self.keeper
    }

    // =========================================================================
    // BLOCK LIFECYCLE
    // =========================================================================

    pub fn apply_block(&mut self, block: &Block) -> RuntimeResult<BlockReport> {
        let _timer = telemetry::block_timer();
        self.begin_block(block.height, block.version.unwrap_or(self.default_version))?;
        let results: Vec<DeliverResult> = block.msgs.iter().map(|msg| self.deliver(msg)).collect();
        let end_block = self.end_block()?;
        telemetry::record_block_applied(block.height);

        let report = BlockReport {
            height: block.height,
            results,
            end_block,
        };
        log_block_event!(
            info,
            "runtime",
            "[runtime] Block applied",
            report.height,
            msgs = report.results.len(),
            failed = report.failed(),
            requeued = report.end_block.requeued
        );
        Ok(report)
    }

    pub fn begin_block(&mut self, height: u64, version: ProtocolVersion) -> RuntimeResult<()> {
        if let Some(last) = self.last_height {
            if height <= last {
                return Err(RuntimeError::BlockOutOfOrder { last, got: height });
            }
        }
        let strategy = HandlerStrategy::resolve(version)?;
        self.keeper.set_block_height(height);
        self.strategy = Some(strategy);
        self.last_height = Some(height);
        debug!(height, %version, "[runtime] Begin block");

        self.keeper.begin();
        match self.on_churn() {
            Ok(()) => self.keeper.commit()?,
            Err(e) => {
                self.keeper.discard();
                return Err(e);
            }
        }
        Ok(())
    }

    /// A changed active set starts with no operational mimir votes.
    fn on_churn(&mut self) -> RuntimeResult<()> {
        let active: BTreeSet<NodeAddress> = self
            .keeper
            .list_active_validators()?
            .into_iter()
            .map(|node| node.node_address)
            .collect();
        let churned = self
            .active_set
            .as_ref()
            .is_some_and(|previous| *previous != active);
        if churned {
            info!(active = active.len(), "[runtime] Active set changed");
            self.managers.governance.purge_operational_votes(&mut self.keeper)?;
        }
        self.active_set = Some(active);
        Ok(())
    }

    /// Validate, apply and commit one message. Never fails the block.
    pub fn deliver(&mut self, msg: &BridgeMsg) -> DeliverResult {
        let kind = msg.kind();
        let Some(strategy) = self.strategy else {
            return self.rejected(kind, &RuntimeError::NoOpenBlock);
        };

        self.keeper.begin();
        let handled = self.handle(strategy, msg);
        let result = match handled {
            Ok(log) => {
                let events = self.keeper.pending_events().len();
                match self.keeper.commit() {
                    Ok(()) => DeliverResult {
                        kind,
                        ok: true,
                        log,
                        events,
                    },
                    Err(e) => {
                        self.keeper.discard();
                        self.rejected(kind, &RuntimeError::from(e))
                    }
                }
            }
            Err(e) => {
                self.keeper.discard();
                self.rejected(kind, &e)
            }
        };
        telemetry::record_message(kind, if result.ok { "ok" } else { "rejected" });
        result
    }

    fn rejected(&self, kind: &'static str, error: &RuntimeError) -> DeliverResult {
        log_event!(warn, "runtime", "[runtime] Message rejected", kind, error = %error);
        DeliverResult {
            kind,
            ok: false,
            log: error.to_string(),
            events: 0,
        }
    }

    fn handle(&mut self, strategy: HandlerStrategy, msg: &BridgeMsg) -> RuntimeResult<String> {
        let keeper = &mut self.keeper;
        let managers = &self.managers;
        match (strategy, msg) {
            (HandlerStrategy::V3, BridgeMsg::ObservedTxIn { txs, signer }) => {
                let report = managers.observation.observed_tx_in(keeper, txs, signer)?;
                Ok(format!(
                    "processed {} skipped {} dispatched {}",
                    report.processed,
                    report.skipped,
                    report.dispatched.len()
                ))
            }
            (HandlerStrategy::V3, BridgeMsg::ObservedTxOut { txs, signer }) => {
                let report = managers.observation.observed_tx_out(keeper, txs, signer)?;
                Ok(format!(
                    "processed {} skipped {} completed {}",
                    report.processed,
                    report.skipped,
                    report.completed.len()
                ))
            }
            (HandlerStrategy::V3, BridgeMsg::Mimir { key, value, signer }) => {
                let vote = MimirVote::new(key.as_str(), *value);
                let outcome = managers.governance.handle_mimir(keeper, &vote, signer)?;
                Ok(format!("{:?}", outcome))
            }
            (HandlerStrategy::V3, BridgeMsg::Ban { node, signer }) => {
                let claim = BanClaim::new(node.clone());
                let progress = managers.governance.handle_ban(keeper, &claim, signer)?;
                Ok(format!("{:?}", progress))
            }
            (HandlerStrategy::V3, BridgeMsg::ErrataTx { tx_id, chain, signer }) => {
                let claim = ErrataClaim::new(tx_id.clone(), chain.clone());
                let progress = managers.governance.handle_errata(keeper, &claim, signer)?;
                Ok(format!("{:?}", progress))
            }
            (
                HandlerStrategy::V3,
                BridgeMsg::Solvency {
                    chain,
                    pub_key,
                    coins,
                    height,
                    signer,
                },
            ) => {
                let claim = SolvencyClaim::new(chain.clone(), pub_key.clone(), coins.clone(), *height);
                let progress = managers.governance.handle_solvency(keeper, &claim, signer)?;
                Ok(format!("{:?}", progress))
            }
        }
    }

    pub fn end_block(&mut self) -> RuntimeResult<EndBlockReport> {
        if self.strategy.take().is_none() {
            return Err(RuntimeError::NoOpenBlock);
        }
        self.keeper.begin();
        match self.managers.scheduler.end_block(&mut self.keeper) {
            Ok(report) => {
                self.keeper.commit()?;
                Ok(report)
            }
            Err(e) => {
                self.keeper.discard();
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn outbound_bucket(&self, height: u64) -> RuntimeResult<TxOut> {
        Ok(self.managers.scheduler.get_outbound_bucket(&self.keeper, height)?)
    }

    pub fn vaults(&self) -> RuntimeResult<Vec<Vault>> {
        Ok(self.keeper.vaults()?.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn mimir(&self, key: &str) -> RuntimeResult<i64> {
        Ok(self.keeper.get_mimir(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qb_01_keeper::{InMemoryKVStore, MemoryEventSink, MIMIR_UNSET};
    use qb_04_outbound::FixedGasManager;
    use shared_types::{
        Address, Chain, Coin, Coins, ConstantValues, NodeAccount, NodeStatus, ObservedTx, PubKey,
        Tx, TxId, VaultStatus, ONE,
    };
    use std::sync::Arc;

    fn btc() -> Chain {
        Chain::new("BTC").unwrap()
    }

    fn addr(name: &str) -> NodeAddress {
        NodeAddress::new(name)
    }

    fn executor() -> BlockExecutor {
        let mut keeper = Keeper::new(
            Box::new(InMemoryKVStore::new()),
            Arc::new(MemoryEventSink::new()),
            ConstantValues::default(),
        );
        for name in ["a", "b", "c"] {
            keeper
                .set_node_account(&NodeAccount::new(
                    addr(name),
                    PubKey::new(&format!("pk-{}", name)),
                    NodeStatus::Active,
                    1_000 * ONE,
                ))
                .unwrap();
        }
        let mut vault = Vault::new(
            PubKey::new("vault"),
            VaultStatus::Active,
            vec![PubKey::new("pk-a"), PubKey::new("pk-b"), PubKey::new("pk-c")],
            1,
        );
        vault.add_funds(&Coins::from(Coin::new(btc().gas_asset(), 100 * ONE)));
        keeper.set_vault(&vault).unwrap();
        keeper.commit().unwrap();

        let managers = Managers::builder()
            .gas(Arc::new(FixedGasManager::new(0).with_chain(btc(), 10_000, 10)))
            .build();
        BlockExecutor::new(keeper, managers)
    }

    fn inbound(memo: &str) -> ObservedTx {
        let tx = Tx {
            id: TxId::new("aa01"),
            chain: btc(),
            from_address: Address::new("bc1user"),
            to_address: PubKey::new("vault").address(&btc()),
            coins: Coins::from(Coin::new(btc().gas_asset(), ONE)),
            gas: Coins::new(),
            memo: memo.to_string(),
        };
        ObservedTx::new(tx, 10, PubKey::new("vault"), 10)
    }

    fn observe(signer: &str, memo: &str) -> BridgeMsg {
        BridgeMsg::ObservedTxIn {
            txs: vec![inbound(memo)],
            signer: addr(signer),
        }
    }

    #[test]
    fn test_mimir_votes_apply_across_messages() {
        let mut exec = executor();
        let block = Block::new(
            1,
            vec![
                BridgeMsg::mimir("K", 4, addr("a")),
                BridgeMsg::mimir("K", 4, addr("b")),
            ],
        );
        let report = exec.apply_block(&block).unwrap();
        assert_eq!(report.failed(), 0);
        assert_eq!(report.results[1].log, "Applied(4)");
        assert_eq!(exec.mimir("K").unwrap(), 4);
    }

    #[test]
    fn test_rejected_message_leaves_no_writes() {
        let mut exec = executor();
        let block = Block::new(
            1,
            vec![
                BridgeMsg::mimir("K", 4, addr("stranger")),
                BridgeMsg::mimir("bad/key", 4, addr("a")),
            ],
        );
        let report = exec.apply_block(&block).unwrap();
        assert_eq!(report.failed(), 2);
        assert_eq!(exec.mimir("K").unwrap(), MIMIR_UNSET);
        let node = exec.keeper().get_node_account(&addr("a")).unwrap().unwrap();
        assert_eq!(node.bond, 1_000 * ONE);
    }

    #[test]
    fn test_forwarded_inbound_lands_in_current_bucket() {
        let mut exec = executor();
        let block = Block::new(
            5,
            vec![
                observe("a", "SEND:bc1friend"),
                observe("b", "SEND:bc1friend"),
                observe("c", "SEND:bc1friend"),
            ],
        );
        let report = exec.apply_block(&block).unwrap();
        assert_eq!(report.failed(), 0);

        let bucket = exec.outbound_bucket(5).unwrap();
        assert_eq!(bucket.tx_array.len(), 1);
        let item = &bucket.tx_array[0];
        assert_eq!(item.to_address, Address::new("bc1friend"));
        assert_eq!(item.in_hash, TxId::new("aa01"));
        assert_eq!(item.vault_pub_key, Some(PubKey::new("vault")));
    }

    #[test]
    fn test_block_order_enforced() {
        let mut exec = executor();
        exec.apply_block(&Block::new(3, Vec::new())).unwrap();
        let err = exec.apply_block(&Block::new(3, Vec::new())).unwrap_err();
        assert!(matches!(err, RuntimeError::BlockOutOfOrder { last: 3, got: 3 }));
    }

    #[test]
    fn test_old_version_rejected_before_any_message() {
        let mut exec = executor();
        let block = Block::new(1, vec![BridgeMsg::mimir("K", 4, addr("a"))])
            .with_version(ProtocolVersion::new(2, 0, 0));
        let err = exec.apply_block(&block).unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedVersion { .. }));
        assert_eq!(exec.mimir("K").unwrap(), MIMIR_UNSET);
    }

    #[test]
    fn test_deliver_outside_block_is_rejected() {
        let mut exec = executor();
        let result = exec.deliver(&BridgeMsg::mimir("K", 1, addr("a")));
        assert!(!result.ok);
        assert!(matches!(exec.end_block(), Err(RuntimeError::NoOpenBlock)));
    }

    #[test]
    fn test_churn_purges_operational_votes() {
        let mut exec = executor();
        exec.apply_block(&Block::new(1, vec![BridgeMsg::mimir("HaltSigning", 1, addr("a"))]))
            .unwrap();
        assert_eq!(exec.keeper().get_node_mimirs("HaltSigning").unwrap().votes.len(), 1);

        // same set: votes survive
        exec.apply_block(&Block::new(2, Vec::new())).unwrap();
        assert_eq!(exec.keeper().get_node_mimirs("HaltSigning").unwrap().votes.len(), 1);

        let mut node = exec.keeper().get_node_account(&addr("c")).unwrap().unwrap();
        node.status = NodeStatus::Standby;
        exec.keeper_mut().set_node_account(&node).unwrap();
        exec.keeper_mut().commit().unwrap();

        exec.apply_block(&Block::new(3, Vec::new())).unwrap();
        assert!(exec.keeper().get_node_mimirs("HaltSigning").unwrap().votes.is_empty());
    }

    #[test]
    fn test_vault_query() {
        let exec = executor();
        let vaults = exec.vaults().unwrap();
        assert_eq!(vaults.len(), 1);
        assert_eq!(vaults[0].coin(&btc().gas_asset()), 100 * ONE);
    }
}
