//! # Security Log Service
//!
//! The record service implementing the `SecurityLogApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Validates input and resolves ids before touching the ledger
//! 2. Writes every primary record change and its index delta in one batch
//! 3. Delegates all reads to the [`QueryEngine`]
//! 4. Uses dependency injection for all external dependencies

mod api;
pub mod query;
mod records;

pub use query::QueryEngine;

use crate::adapters::{
    InMemoryLedger, JsonRecordCodec, RecordingEventSink, StaticIdentity, SystemTimeSource,
    UuidGenerator,
};
use crate::domain::index::SeverityIndex;
use crate::domain::value_objects::StoreConfig;
use crate::ports::outbound::{
    EventSink, IdGenerator, IdentityProvider, LedgerState, RecordCodec, TimeSource,
};

/// The security log service.
pub struct SecurityLogService<L, C, I, E, T, G>
where
    L: LedgerState,
    C: RecordCodec,
    I: IdentityProvider,
    E: EventSink,
    T: TimeSource,
    G: IdGenerator,
{
    /// Host ledger holding records and index entries.
    pub(crate) ledger: L,
    /// Record encoding.
    pub(crate) codec: C,
    /// Submitter identity of the current invocation.
    pub(crate) identity: I,
    /// Host event channel.
    pub(crate) events: E,
    /// Time source for record stamps.
    pub(crate) clock: T,
    /// Fresh record ids.
    pub(crate) ids: G,
    pub(crate) config: StoreConfig,
    pub(crate) index: SeverityIndex,
}

/// Dependencies for SecurityLogService
pub struct SecurityLogDependencies<L, C, I, E, T, G> {
    pub ledger: L,
    pub codec: C,
    pub identity: I,
    pub events: E,
    pub clock: T,
    pub ids: G,
}

impl<L, C, I, E, T, G> SecurityLogService<L, C, I, E, T, G>
where
    L: LedgerState,
    C: RecordCodec,
    I: IdentityProvider,
    E: EventSink,
    T: TimeSource,
    G: IdGenerator,
{
    /// Create a service over the given dependencies.
    ///
    /// The index namespace comes from `config`.
    pub fn new(deps: SecurityLogDependencies<L, C, I, E, T, G>, config: StoreConfig) -> Self {
        Self {
            ledger: deps.ledger,
            codec: deps.codec,
            identity: deps.identity,
            events: deps.events,
            clock: deps.clock,
            ids: deps.ids,
            index: SeverityIndex::new(config.index_namespace.clone()),
            config,
        }
    }

    /// Read-side view over the current ledger state.
    pub fn query(&self) -> QueryEngine<'_, L, C> {
        QueryEngine::new(&self.ledger, &self.codec, &self.index, &self.config)
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable ledger access, used by hosts for transaction control.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn index(&self) -> &SeverityIndex {
        &self.index
    }
}

/// Service wired to the in-memory reference adapters.
pub type InMemorySecurityLogService = SecurityLogService<
    InMemoryLedger,
    JsonRecordCodec,
    StaticIdentity,
    RecordingEventSink,
    SystemTimeSource,
    UuidGenerator,
>;

impl InMemorySecurityLogService {
    /// In-memory service submitting as `submitter`.
    pub fn new_in_memory(submitter: impl Into<String>, config: StoreConfig) -> Self {
        let deps = SecurityLogDependencies {
            ledger: InMemoryLedger::new(),
            codec: JsonRecordCodec,
            identity: StaticIdentity::new(submitter),
            events: RecordingEventSink::new(),
            clock: SystemTimeSource,
            ids: UuidGenerator,
        };
        Self::new(deps, config)
    }
}
