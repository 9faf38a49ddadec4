//! # Contract Dispatcher
//!
//! Maps host invocations onto the `SecurityLogApi`.
//!
//! The host calls a named function with string arguments. [`Operation`] is
//! the closed set of those functions, parsed once at the boundary;
//! [`ContractHost`] wraps each mutating operation in a ledger transaction
//! that commits on success and rolls back on error.

use crate::domain::entities::{
    CreateOutcome, HistoryEntry, IndexAudit, NewRecord, PaginatedRecords, PurgeReport,
    ScanReport, SecurityRecord,
};
use crate::domain::errors::{CodecError, RecordError, RecordErrorPayload};
use crate::domain::value_objects::Timestamp;
use crate::ports::inbound::SecurityLogApi;
use crate::ports::outbound::{
    EventSink, IdGenerator, IdentityProvider, LedgerTimestamp, RecordCodec, TimeSource,
    TransactionalLedger,
};
use crate::service::SecurityLogService;
use seclog_telemetry::log_event;
use serde::Serialize;
use std::collections::BTreeMap;

/// Every operation the contract exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create(NewRecord),
    CreateWithAttachment { input: NewRecord, reference: String },
    Read { id: String },
    Update { id: String, changes: NewRecord },
    Delete { id: String },
    AttachReference { id: String, reference: String },
    QueryBySeverity { severity: String },
    QueryAll,
    QueryWithAttachment,
    QueryByTimeRange { start: Timestamp, end: Timestamp },
    QueryBySubmitter { submitter: String },
    QueryPaginated { page_size: u32, bookmark: String },
    QueryHistory { id: String },
    CountBySeverity,
    CountByAttackType,
    PurgeOlderThan { threshold: Timestamp },
    AuditIndex,
}

impl Operation {
    /// Host function name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "CreateLog",
            Self::CreateWithAttachment { .. } => "CreateLogWithAttachment",
            Self::Read { .. } => "ReadLog",
            Self::Update { .. } => "UpdateLog",
            Self::Delete { .. } => "DeleteLog",
            Self::AttachReference { .. } => "AddAttachmentToLog",
            Self::QueryBySeverity { .. } => "GetLogsBySeverity",
            Self::QueryAll => "GetAllLogs",
            Self::QueryWithAttachment => "GetLogsWithAttachments",
            Self::QueryByTimeRange { .. } => "GetLogsByTimeRange",
            Self::QueryBySubmitter { .. } => "GetLogsBySubmitter",
            Self::QueryPaginated { .. } => "GetAllLogsPaginated",
            Self::QueryHistory { .. } => "GetLogHistory",
            Self::CountBySeverity => "CountBySeverity",
            Self::CountByAttackType => "CountByAttackType",
            Self::PurgeOlderThan { .. } => "PurgeLogsByTime",
            Self::AuditIndex => "AuditIndex",
        }
    }

    /// Operations that never write.
    pub fn is_read_only(&self) -> bool {
        !matches!(
            self,
            Self::Create(_)
                | Self::CreateWithAttachment { .. }
                | Self::Update { .. }
                | Self::Delete { .. }
                | Self::AttachReference { .. }
                | Self::PurgeOlderThan { .. }
        )
    }

    /// Parse a host invocation. Unknown functions, wrong arity and
    /// unparsable numbers are validation errors.
    pub fn from_invocation(function: &str, args: &[String]) -> Result<Self, RecordError> {
        let op = match function {
            "CreateLog" => {
                let [attack_type, source_ip, severity, description] = take::<4>(function, args)?;
                Self::Create(NewRecord::new(attack_type, source_ip, severity, description))
            }
            "CreateLogWithAttachment" => {
                let [attack_type, source_ip, severity, description, reference] =
                    take::<5>(function, args)?;
                Self::CreateWithAttachment {
                    input: NewRecord::new(attack_type, source_ip, severity, description),
                    reference,
                }
            }
            "ReadLog" => {
                let [id] = take::<1>(function, args)?;
                Self::Read { id }
            }
            "UpdateLog" => {
                let [id, attack_type, source_ip, severity, description] =
                    take::<5>(function, args)?;
                Self::Update {
                    id,
                    changes: NewRecord::new(attack_type, source_ip, severity, description),
                }
            }
            "DeleteLog" => {
                let [id] = take::<1>(function, args)?;
                Self::Delete { id }
            }
            "AddAttachmentToLog" => {
                let [id, reference] = take::<2>(function, args)?;
                Self::AttachReference { id, reference }
            }
            "GetLogsBySeverity" => {
                let [severity] = take::<1>(function, args)?;
                Self::QueryBySeverity { severity }
            }
            "GetAllLogs" => {
                take::<0>(function, args)?;
                Self::QueryAll
            }
            "GetLogsWithAttachments" => {
                take::<0>(function, args)?;
                Self::QueryWithAttachment
            }
            "GetLogsByTimeRange" => {
                let [start, end] = take::<2>(function, args)?;
                Self::QueryByTimeRange {
                    start: parse_number(&start, "startUnix")?,
                    end: parse_number(&end, "endUnix")?,
                }
            }
            "GetLogsBySubmitter" => {
                let [submitter] = take::<1>(function, args)?;
                Self::QueryBySubmitter { submitter }
            }
            "GetAllLogsPaginated" => {
                let [page_size, bookmark] = take::<2>(function, args)?;
                Self::QueryPaginated {
                    page_size: parse_number(&page_size, "pageSize")?,
                    bookmark,
                }
            }
            "GetLogHistory" => {
                let [id] = take::<1>(function, args)?;
                Self::QueryHistory { id }
            }
            "CountBySeverity" => {
                take::<0>(function, args)?;
                Self::CountBySeverity
            }
            "CountByAttackType" => {
                take::<0>(function, args)?;
                Self::CountByAttackType
            }
            "PurgeLogsByTime" => {
                let [threshold] = take::<1>(function, args)?;
                Self::PurgeOlderThan {
                    threshold: parse_number(&threshold, "olderThanUnix")?,
                }
            }
            "AuditIndex" => {
                take::<0>(function, args)?;
                Self::AuditIndex
            }
            other => {
                return Err(RecordError::validation(format!("unknown function {other}")));
            }
        };
        Ok(op)
    }
}

fn take<const N: usize>(function: &str, args: &[String]) -> Result<[String; N], RecordError> {
    <[String; N]>::try_from(args.to_vec()).map_err(|_| {
        RecordError::validation(format!(
            "{function} expects {N} arguments, got {}",
            args.len()
        ))
    })
}

fn parse_number<N: std::str::FromStr>(raw: &str, name: &str) -> Result<N, RecordError> {
    raw.trim()
        .parse()
        .map_err(|_| RecordError::validation(format!("{name} is not a valid number: {raw:?}")))
}

/// Result of one dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Created(CreateOutcome),
    Record(SecurityRecord),
    Records(Vec<SecurityRecord>),
    SeverityRecords(ScanReport<SecurityRecord>),
    Page(PaginatedRecords),
    History(ScanReport<HistoryEntry>),
    Counts(BTreeMap<String, u64>),
    Purged(PurgeReport),
    Audit(IndexAudit),
    Done,
}

impl Response {
    /// JSON payload returned to the host. `Done` has an empty payload.
    pub fn to_payload(&self) -> Result<Vec<u8>, RecordError> {
        if matches!(self, Self::Done) {
            return Ok(Vec::new());
        }
        serde_json::to_vec(self)
            .map_err(|e| RecordError::Codec(CodecError::new(e.to_string())))
    }
}

/// Plays the host runtime: one transaction per mutating invocation.
pub struct ContractHost<L, C, I, E, T, G>
where
    L: TransactionalLedger,
    C: RecordCodec,
    I: IdentityProvider,
    E: EventSink,
    T: TimeSource,
    G: IdGenerator,
{
    service: SecurityLogService<L, C, I, E, T, G>,
    tx_counter: u64,
}

impl<L, C, I, E, T, G> ContractHost<L, C, I, E, T, G>
where
    L: TransactionalLedger,
    C: RecordCodec,
    I: IdentityProvider,
    E: EventSink,
    T: TimeSource,
    G: IdGenerator,
{
    pub fn new(service: SecurityLogService<L, C, I, E, T, G>) -> Self {
        Self {
            service,
            tx_counter: 0,
        }
    }

    pub fn service(&self) -> &SecurityLogService<L, C, I, E, T, G> {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut SecurityLogService<L, C, I, E, T, G> {
        &mut self.service
    }

    pub fn into_service(self) -> SecurityLogService<L, C, I, E, T, G> {
        self.service
    }

    /// Parse and run a host invocation.
    pub fn invoke_raw(&mut self, function: &str, args: &[String]) -> Result<Response, RecordError> {
        let op = Operation::from_invocation(function, args)?;
        self.invoke(op)
    }

    /// Host-facing entry point: JSON payload on success, serializable error
    /// otherwise.
    pub fn handle(&mut self, function: &str, args: &[String]) -> Result<Vec<u8>, RecordErrorPayload> {
        self.invoke_raw(function, args)
            .and_then(|response| response.to_payload())
            .map_err(|err| RecordErrorPayload::from(&err))
    }

    /// Run one operation. Mutations run inside their own transaction.
    pub fn invoke(&mut self, op: Operation) -> Result<Response, RecordError> {
        if op.is_read_only() {
            return self.execute(op);
        }

        self.tx_counter += 1;
        let tx_id = format!("tx-{:06}", self.tx_counter);
        let timestamp = LedgerTimestamp::from_seconds(self.service.clock().now());
        let name = op.name();

        self.service
            .ledger_mut()
            .begin_transaction(&tx_id, timestamp)?;

        match self.execute(op) {
            Ok(response) => {
                self.service.ledger_mut().commit_transaction()?;
                log_event!(debug, name, "Transaction committed", tx_id = %tx_id);
                Ok(response)
            }
            Err(err) => {
                if let Err(rollback) = self.service.ledger_mut().rollback_transaction() {
                    log_event!(
                        error,
                        name,
                        "Rollback failed",
                        tx_id = %tx_id,
                        reason = %rollback
                    );
                }
                log_event!(warn, name, "Transaction rolled back", tx_id = %tx_id, reason = %err);
                Err(err)
            }
        }
    }

    fn execute(&mut self, op: Operation) -> Result<Response, RecordError> {
        let service = &mut self.service;
        let response = match op {
            Operation::Create(input) => Response::Created(service.create(input)?),
            Operation::CreateWithAttachment { input, reference } => {
                Response::Created(service.create_with_attachment(input, &reference)?)
            }
            Operation::Read { id } => Response::Record(service.read(&id)?),
            Operation::Update { id, changes } => Response::Record(service.update(&id, changes)?),
            Operation::Delete { id } => {
                service.delete(&id)?;
                Response::Done
            }
            Operation::AttachReference { id, reference } => {
                Response::Record(service.attach_reference(&id, &reference)?)
            }
            Operation::QueryBySeverity { severity } => {
                Response::SeverityRecords(service.query_by_severity(&severity)?)
            }
            Operation::QueryAll => Response::Records(service.query_all()?),
            Operation::QueryWithAttachment => Response::Records(service.query_with_attachment()?),
            Operation::QueryByTimeRange { start, end } => {
                Response::Records(service.query_by_time_range(start, end)?)
            }
            Operation::QueryBySubmitter { submitter } => {
                Response::Records(service.query_by_submitter(&submitter)?)
            }
            Operation::QueryPaginated {
                page_size,
                bookmark,
            } => Response::Page(service.query_paginated(page_size, &bookmark)?),
            Operation::QueryHistory { id } => Response::History(service.query_history(&id)?),
            Operation::CountBySeverity => Response::Counts(service.count_by_severity()?),
            Operation::CountByAttackType => Response::Counts(service.count_by_attack_type()?),
            Operation::PurgeOlderThan { threshold } => {
                Response::Purged(service.purge_older_than(threshold)?)
            }
            Operation::AuditIndex => Response::Audit(service.audit_index()?),
        };
        Ok(response)
    }
}
