//! # Managers
//!
//! Every subsystem service, built once and shared by `Arc`. The services are
//! stateless; all state lives in the keeper the executor owns.
//!
//! ```text
//! KeeperValidatorProvider ──→ AttestationService ─┬─→ ObservationPipeline
//!                                                  │        ↑      ↑
//! GasManager ──┬──→ OutboundScheduler ─────────────┼────────┘      │
//! Ranking ─────┘            │                      │   InboundDispatcher
//!                           └──────────────────────┴─→ GovernanceService
//! ```

use qb_02_attestation::{AttestationService, KeeperValidatorProvider, ValidatorSetProvider};
use qb_03_observation::{InboundDispatcher, ObservationPipeline};
use qb_04_outbound::{
    BondSecurityRanking, GasManager, NetworkFeeGasManager, OutboundScheduler, VaultSecurityRanking,
};
use qb_05_governance::GovernanceService;
use std::sync::Arc;
use tracing::info;

use crate::adapters::PassthroughDispatcher;

#[derive(Clone)]
pub struct Managers {
    pub attestation: Arc<AttestationService>,
    pub scheduler: Arc<OutboundScheduler>,
    pub observation: Arc<ObservationPipeline>,
    pub governance: Arc<GovernanceService>,
}

impl Managers {
    /// Production wiring: validators and gas come from keeper state.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ManagersBuilder {
        ManagersBuilder::default()
    }
}

impl Default for Managers {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces individual ports before wiring; tests use it to pin gas or
/// the validator set.
pub struct ManagersBuilder {
    validators: Arc<dyn ValidatorSetProvider>,
    gas: Arc<dyn GasManager>,
    ranking: Arc<dyn VaultSecurityRanking>,
    dispatcher: Arc<dyn InboundDispatcher>,
}

impl Default for ManagersBuilder {
    fn default() -> Self {
        Self {
            validators: Arc::new(KeeperValidatorProvider),
            gas: Arc::new(NetworkFeeGasManager),
            ranking: Arc::new(BondSecurityRanking),
            dispatcher: Arc::new(PassthroughDispatcher),
        }
    }
}

impl ManagersBuilder {
    pub fn validators(mut self, validators: Arc<dyn ValidatorSetProvider>) -> Self {
        self.validators = validators;
        self
    }

    pub fn gas(mut self, gas: Arc<dyn GasManager>) -> Self {
        self.gas = gas;
        self
    }

    pub fn ranking(mut self, ranking: Arc<dyn VaultSecurityRanking>) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn InboundDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Wire in dependency order: attestation, scheduler, then the two
    /// services built on top of them.
    pub fn build(self) -> Managers {
        let attestation = Arc::new(AttestationService::new(self.validators));
        let scheduler = Arc::new(OutboundScheduler::new(self.gas.clone(), self.ranking));
        let observation = Arc::new(ObservationPipeline::new(
            attestation.clone(),
            self.dispatcher,
            scheduler.clone(),
        ));
        let governance = Arc::new(GovernanceService::new(
            attestation.clone(),
            scheduler.clone(),
            self.gas,
        ));
        info!("[runtime] Managers wired");
        Managers {
            attestation,
            scheduler,
            observation,
            governance,
        }
    }
}
