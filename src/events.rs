//! # Event Decoding
//!
//! Decodes chain-neutral event logs into typed events.
//!
//! ## Available Components
//!
//! - [`DecodedEvent`] - Closed sum of decode outcomes, including
//!   [`DecodedEvent::Unrecognized`] as a value rather than an error
//! - [`TransferEvent`] / [`ApprovalEvent`] / [`ApprovalForAllEvent`] - Typed
//!   well-known token events
//! - [`decode_known_event`] - Decode against the built-in event set
//! - [`decode_event_log`] / [`decode_event_logs`] - Decode against a
//!   registered ABI
//!
//! A log whose signature topic matches no known event is *foreign*, not
//! broken: callers get [`DecodedEvent::Unrecognized`] and keep processing
//! sibling logs. Only a shape mismatch on a recognized signature is an
//! error.

use crate::abi::{self, AbiRegistry};
use crate::error::{ChainError, ChainResult};
use crate::types::EventLog;
use ethers::abi::{Event, EventParam, ParamType, RawLog, Token};
use ethers::types::{Address, H256, U256};
use std::sync::OnceLock;

/// Name of the ERC-20/ERC-721 `Transfer` event.
pub const TRANSFER_EVENT: &str = "Transfer";
/// Name of the ERC-20 `Approval` event.
pub const APPROVAL_EVENT: &str = "Approval";
/// Name of the ERC-721/ERC-1155 `ApprovalForAll` event.
pub const APPROVAL_FOR_ALL_EVENT: &str = "ApprovalForAll";

/// Provenance of a decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOrigin {
    /// Emitting contract, in the family's canonical string form.
    pub contract: String,
    /// Event name as declared in the ABI.
    pub event: String,
    /// Event signature hash (`topics[0]`).
    pub signature: H256,
}

/// A decoded `Transfer(address,address,uint256)` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    /// Provenance.
    pub origin: EventOrigin,
    /// Sender of the transferred amount.
    pub from: Address,
    /// Receiver of the transferred amount.
    pub to: Address,
    /// Transferred amount (or token id for ERC-721 emitters).
    pub value: U256,
}

/// A decoded `Approval(address,address,uint256)` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalEvent {
    /// Provenance.
    pub origin: EventOrigin,
    /// Owner granting the allowance.
    pub owner: Address,
    /// Spender receiving the allowance.
    pub spender: Address,
    /// Approved amount.
    pub value: U256,
}

/// A decoded `ApprovalForAll(address,address,bool)` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalForAllEvent {
    /// Provenance.
    pub origin: EventOrigin,
    /// Owner granting or revoking the operator.
    pub owner: Address,
    /// Operator being granted or revoked.
    pub operator: Address,
    /// True when the operator is granted.
    pub approved: bool,
}

/// An event recognized by a registered ABI but not one of the well-known
/// shapes. Fields are in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericEvent {
    /// Provenance.
    pub origin: EventOrigin,
    /// Decoded values in declaration order.
    pub fields: Vec<Token>,
}

/// Outcome of decoding one event log.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedEvent {
    /// A `Transfer` event.
    Transfer(TransferEvent),
    /// An `Approval` event.
    Approval(ApprovalEvent),
    /// An `ApprovalForAll` event.
    ApprovalForAll(ApprovalForAllEvent),
    /// Recognized by the ABI but not a well-known shape.
    Other(GenericEvent),
    /// No known event matches the log's signature topic. This is a value,
    /// not an error: foreign logs are expected in mixed transactions.
    Unrecognized {
        /// Emitting contract.
        contract: String,
        /// The unmatched signature topic, when the log had topics at all.
        topic: Option<H256>,
    },
}

impl DecodedEvent {
    /// Returns true unless the log was foreign to the event set.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized { .. })
    }

    /// Returns the provenance of a recognized event.
    #[must_use]
    pub fn origin(&self) -> Option<&EventOrigin> {
        match self {
            Self::Transfer(event) => Some(&event.origin),
            Self::Approval(event) => Some(&event.origin),
            Self::ApprovalForAll(event) => Some(&event.origin),
            Self::Other(event) => Some(&event.origin),
            Self::Unrecognized { .. } => None,
        }
    }

    /// Returns the event name of a recognized event.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.origin().map(|origin| origin.event.as_str())
    }
}

fn transfer_definition() -> Event {
    Event {
        name: TRANSFER_EVENT.into(),
        inputs: vec![
            EventParam {
                name: "from".into(),
                kind: ParamType::Address,
                indexed: true,
            },
            EventParam {
                name: "to".into(),
                kind: ParamType::Address,
                indexed: true,
            },
            EventParam {
                name: "value".into(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
        ],
        anonymous: false,
    }
}

fn approval_definition() -> Event {
    Event {
        name: APPROVAL_EVENT.into(),
        inputs: vec![
            EventParam {
                name: "owner".into(),
                kind: ParamType::Address,
                indexed: true,
            },
            EventParam {
                name: "spender".into(),
                kind: ParamType::Address,
                indexed: true,
            },
            EventParam {
                name: "value".into(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
        ],
        anonymous: false,
    }
}

fn approval_for_all_definition() -> Event {
    Event {
        name: APPROVAL_FOR_ALL_EVENT.into(),
        inputs: vec![
            EventParam {
                name: "owner".into(),
                kind: ParamType::Address,
                indexed: true,
            },
            EventParam {
                name: "operator".into(),
                kind: ParamType::Address,
                indexed: true,
            },
            EventParam {
                name: "approved".into(),
                kind: ParamType::Bool,
                indexed: false,
            },
        ],
        anonymous: false,
    }
}

fn known_definitions() -> &'static [Event; 3] {
    static EVENTS: OnceLock<[Event; 3]> = OnceLock::new();
    EVENTS.get_or_init(|| {
        [
            transfer_definition(),
            approval_definition(),
            approval_for_all_definition(),
        ]
    })
}

fn unrecognized(log: &EventLog) -> DecodedEvent {
    DecodedEvent::Unrecognized {
        contract: log.address.clone(),
        topic: log.topic0(),
    }
}

fn parse_event_tokens(event: &Event, log: &EventLog) -> ChainResult<Vec<Token>> {
    let parsed = event
        .parse_log(RawLog {
            topics: log.topics.clone(),
            data: log.data.to_vec(),
        })
        .map_err(|e| ChainError::encoding(format!("decoding event {} failed: {e}", event.name)))?;
    Ok(parsed.params.into_iter().map(|param| param.value).collect())
}

fn typed_event(origin: EventOrigin, tokens: Vec<Token>) -> ChainResult<DecodedEvent> {
    match (origin.event.as_str(), tokens.as_slice()) {
        (TRANSFER_EVENT, [from, to, value]) => Ok(DecodedEvent::Transfer(TransferEvent {
            from: abi::as_address(from)?,
            to: abi::as_address(to)?,
            value: abi::as_uint(value)?,
            origin,
        })),
        (APPROVAL_EVENT, [owner, spender, value]) => Ok(DecodedEvent::Approval(ApprovalEvent {
            owner: abi::as_address(owner)?,
            spender: abi::as_address(spender)?,
            value: abi::as_uint(value)?,
            origin,
        })),
        (APPROVAL_FOR_ALL_EVENT, [owner, operator, approved]) => {
            Ok(DecodedEvent::ApprovalForAll(ApprovalForAllEvent {
                owner: abi::as_address(owner)?,
                operator: abi::as_address(operator)?,
                approved: abi::as_bool(approved)?,
                origin,
            }))
        }
        (TRANSFER_EVENT | APPROVAL_EVENT | APPROVAL_FOR_ALL_EVENT, _) => Err(
            ChainError::encoding(format!("event {} has an unexpected arity", origin.event)),
        ),
        _ => Ok(DecodedEvent::Other(GenericEvent {
            origin,
            fields: tokens,
        })),
    }
}

/// Decodes a log against the built-in well-known event set.
///
/// # Errors
///
/// Returns [`ChainError::Encoding`] only when a log matching a known
/// signature fails to decode; foreign logs yield
/// [`DecodedEvent::Unrecognized`].
pub fn decode_known_event(log: &EventLog) -> ChainResult<DecodedEvent> {
    let Some(topic0) = log.topic0() else {
        return Ok(unrecognized(log));
    };
    for event in known_definitions() {
        if event.signature() == topic0 {
            let origin = EventOrigin {
                contract: log.address.clone(),
                event: event.name.clone(),
                signature: topic0,
            };
            let tokens = parse_event_tokens(event, log)?;
            return typed_event(origin, tokens);
        }
    }
    Ok(unrecognized(log))
}

/// Decodes every log against the built-in event set, never failing the
/// batch: a malformed recognized log degrades to
/// [`DecodedEvent::Unrecognized`] with a warning.
#[must_use]
pub fn decode_known_events(logs: &[EventLog]) -> Vec<DecodedEvent> {
    logs.iter()
        .map(|log| {
            decode_known_event(log).unwrap_or_else(|e| {
                tracing::warn!(contract = %log.address, error = %e, "skipping undecodable log");
                unrecognized(log)
            })
        })
        .collect()
}

/// Decodes a log against a registered ABI. Events whose names match the
/// well-known set decode to the typed variants; other matches decode to
/// [`DecodedEvent::Other`].
///
/// # Errors
///
/// Returns [`ChainError::NotFound`] when `abi_name` is not registered and
/// [`ChainError::Encoding`] when a matching event fails to decode. A log
/// whose signature matches no event in the ABI yields
/// [`DecodedEvent::Unrecognized`].
pub fn decode_event_log(
    registry: &AbiRegistry,
    abi_name: &str,
    log: &EventLog,
) -> ChainResult<DecodedEvent> {
    let contract_abi = registry.get(abi_name)?;
    let Some(topic0) = log.topic0() else {
        return Ok(unrecognized(log));
    };
    let Some(event) = contract_abi
        .events()
        .find(|event| event.signature() == topic0)
    else {
        return Ok(unrecognized(log));
    };

    let origin = EventOrigin {
        contract: log.address.clone(),
        event: event.name.clone(),
        signature: topic0,
    };
    let tokens = parse_event_tokens(event, log)?;
    typed_event(origin, tokens)
}

/// Decodes a batch of logs against a registered ABI. Unrecognized logs never
/// abort processing of their siblings.
///
/// # Errors
///
/// Returns the first [`ChainError::NotFound`] or [`ChainError::Encoding`]
/// raised by an individual log.
pub fn decode_event_logs(
    registry: &AbiRegistry,
    abi_name: &str,
    logs: &[EventLog],
) -> ChainResult<Vec<DecodedEvent>> {
    logs.iter()
        .map(|log| decode_event_log(registry, abi_name, log))
        .collect()
}
