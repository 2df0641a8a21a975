//! Domain types for the PortGate booking and gate-admission engine.
//!
//! This module contains the value objects and entities shared by every
//! component of the engine: identifiers, time slots, bookings and their
//! status machine, audit records, and notarization records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a time slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(Uuid);

impl SlotId {
    /// Creates a new random `SlotId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `SlotId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a physical gate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateId(Uuid);

impl GateId {
    /// Creates a new random `GateId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `GateId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a truck
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TruckId(Uuid);

impl TruckId {
    /// Creates a new random `TruckId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TruckId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TruckId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TruckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a carrier company
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarrierId(Uuid);

impl CarrierId {
    /// Creates a new random `CarrierId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `CarrierId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CarrierId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CarrierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an acting principal (carrier user, operator, scanner)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Creates a new random `ActorId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `ActorId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One-time admission proof token, assigned when a booking is confirmed.
///
/// The token is returned to the carrier with the confirmed booking and is
/// included in notarization payloads. It is not a lookup key at the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofToken(Uuid);

impl ProofToken {
    /// Creates a new random `ProofToken`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ProofToken` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProofToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProofToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Actor context
// ============================================================================

/// Role of the acting principal, as resolved by the upstream identity
/// provider. The engine trusts it and never authenticates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Carrier-side user reserving passage windows
    Carrier,
    /// Terminal staff approving, rejecting, and configuring slots
    Operator,
    /// Automated caller (gate scanner, internal jobs)
    System,
}

impl Role {
    /// Stable lower-case encoding used on the wire and in audit details
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Carrier => "carrier",
            Self::Operator => "operator",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "carrier" => Ok(Self::Carrier),
            "operator" => Ok(Self::Operator),
            "system" => Ok(Self::System),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Identity and role of the caller, injected into every engine call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// Acting principal
    pub actor_id: ActorId,
    /// Resolved role
    pub role: Role,
}

impl ActorContext {
    /// Creates a new `ActorContext`
    #[must_use]
    pub const fn new(actor_id: ActorId, role: Role) -> Self {
        Self { actor_id, role }
    }
}

// ============================================================================
// Time slots
// ============================================================================

/// A bounded passage window at a specific gate with a maximum truck capacity.
///
/// `current_bookings` is mutated only through the capacity ledger's
/// reserve/release operations and never exceeds `max_capacity`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Slot identifier
    pub id: SlotId,
    /// Gate this window belongs to
    pub gate_id: GateId,
    /// Window start (inclusive)
    pub starts_at: DateTime<Utc>,
    /// Window end (inclusive)
    pub ends_at: DateTime<Utc>,
    /// Maximum number of concurrent bookings
    pub max_capacity: u32,
    /// Number of live (non-rejected, non-cancelled) bookings
    pub current_bookings: u32,
}

impl TimeSlot {
    /// Creates a new empty slot for a gate.
    #[must_use]
    pub fn new(
        gate_id: GateId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        max_capacity: u32,
    ) -> Self {
        Self {
            id: SlotId::new(),
            gate_id,
            starts_at,
            ends_at,
            max_capacity,
            current_bookings: 0,
        }
    }

    /// Remaining capacity in this window
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.max_capacity.saturating_sub(self.current_bookings)
    }

    /// Whether `instant` falls inside the window. Both boundary instants
    /// are inside.
    #[must_use]
    pub fn window_contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.starts_at && instant <= self.ends_at
    }

    /// Whether the window is already over at `instant`
    #[must_use]
    pub fn window_closed_at(&self, instant: DateTime<Utc>) -> bool {
        instant > self.ends_at
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Status of a booking.
///
/// The state machine is fixed:
///
/// ```text
/// Pending → Confirmed → Consumed
///    ↓           ↓
/// Rejected   Cancelled
///    (Pending → Cancelled also allowed)
/// ```
///
/// Consumed, Rejected, and Cancelled are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting operator review
    Pending,
    /// Approved; admissible at the gate once the window opens
    Confirmed,
    /// Admitted through the gate; terminal
    Consumed,
    /// Declined by an operator; terminal
    Rejected,
    /// Withdrawn by the carrier or staff; terminal
    Cancelled,
}

impl BookingStatus {
    /// Stable lower-case encoding used on the wire and in the database
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Consumed => "consumed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is permitted out of this status
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Consumed | Self::Rejected | Self::Cancelled)
    }

    /// Whether the state machine permits moving from `self` to `target`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending,
                Self::Confirmed | Self::Rejected | Self::Cancelled
            ) | (Self::Confirmed, Self::Consumed | Self::Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "consumed" => Ok(Self::Consumed),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// Driver metadata captured with a booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Driver full name
    pub name: String,
    /// Contact channel (phone or email)
    pub contact: String,
    /// Credential presented at the gate (licence or port pass number)
    pub credential: String,
}

impl DriverInfo {
    /// Creates a new `DriverInfo`
    #[must_use]
    pub const fn new(name: String, contact: String, credential: String) -> Self {
        Self {
            name,
            contact,
            credential,
        }
    }
}

/// A reservation binding a truck and carrier to a time slot.
///
/// Bookings are never physically deleted; cancellation is a terminal
/// status, not a deletion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier
    pub id: BookingId,
    /// Current status
    pub status: BookingStatus,
    /// Reserved slot
    pub slot_id: SlotId,
    /// Truck performing the passage
    pub truck_id: TruckId,
    /// Registration plate, shown to the gate operator on admission
    pub truck_plate: String,
    /// Carrier the truck belongs to
    pub carrier_id: CarrierId,
    /// Principal that requested the booking
    pub requested_by: ActorId,
    /// Driver metadata
    pub driver: DriverInfo,
    /// One-time admission proof token, present once confirmed
    pub proof_token: Option<ProofToken>,
    /// Optional free-text note from the requester
    pub note: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last status-change timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a new booking in `Pending` status from a validated request.
    #[must_use]
    pub fn new(request: CreateBookingRequest, requested_by: ActorId, now: DateTime<Utc>) -> Self {
        Self {
            id: BookingId::new(),
            status: BookingStatus::Pending,
            slot_id: request.slot_id,
            truck_id: request.truck_id,
            truck_plate: request.truck_plate,
            carrier_id: request.carrier_id,
            requested_by,
            driver: request.driver,
            proof_token: None,
            note: request.note,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for the create-booking operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// Slot to reserve
    pub slot_id: SlotId,
    /// Truck performing the passage
    pub truck_id: TruckId,
    /// Registration plate of the truck
    pub truck_plate: String,
    /// Carrier the truck belongs to
    pub carrier_id: CarrierId,
    /// Driver metadata
    pub driver: DriverInfo,
    /// Optional free-text note
    pub note: Option<String>,
}

/// Filter for booking list queries.
///
/// Scope narrowing (own bookings vs. all) is decided by the caller from
/// the resolved role; the engine only applies the filter it is handed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFilter {
    /// Only bookings requested by this principal
    pub requested_by: Option<ActorId>,
    /// Only bookings for this carrier
    pub carrier_id: Option<CarrierId>,
    /// Only bookings against this slot
    pub slot_id: Option<SlotId>,
    /// Only bookings in this status
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    /// Whether `booking` satisfies every set field of the filter
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        self.requested_by
            .is_none_or(|actor| booking.requested_by == actor)
            && self.carrier_id.is_none_or(|c| booking.carrier_id == c)
            && self.slot_id.is_none_or(|s| booking.slot_id == s)
            && self.status.is_none_or(|s| booking.status == s)
    }
}

// ============================================================================
// Admission
// ============================================================================

/// Summary returned to the gate when admission is granted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionSummary {
    /// Admitted booking
    pub booking_id: BookingId,
    /// Truck registration plate, for the operator display
    pub truck_plate: String,
    /// Driver name, for the operator display
    pub driver_name: String,
    /// Gate the truck was admitted through
    pub gate_id: GateId,
    /// Status after admission (always `Consumed`)
    pub status: BookingStatus,
    /// Admission instant
    pub granted_at: DateTime<Utc>,
}

// ============================================================================
// Audit trail
// ============================================================================

/// Unique identifier for an audit entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditEntryId(Uuid);

impl AuditEntryId {
    /// Creates a new random `AuditEntryId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `AuditEntryId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AuditEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuditEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of state-changing action recorded in the audit trail
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditAction {
    /// A slot was configured
    SlotCreated,
    /// A booking was created in `Pending`
    BookingCreated,
    /// A booking moved to `Confirmed`
    BookingConfirmed,
    /// A booking moved to `Rejected`
    BookingRejected,
    /// A booking moved to `Cancelled`
    BookingCancelled,
    /// A truck was admitted through a gate
    AdmissionGranted,
    /// An admission attempt was denied
    AdmissionDenied,
    /// An external ledger write failed; local trail remains authoritative
    NotarizationFailed,
}

impl AuditAction {
    /// Stable kebab-case encoding used on the wire and in the database
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SlotCreated => "slot-created",
            Self::BookingCreated => "booking-created",
            Self::BookingConfirmed => "booking-confirmed",
            Self::BookingRejected => "booking-rejected",
            Self::BookingCancelled => "booking-cancelled",
            Self::AdmissionGranted => "admission-granted",
            Self::AdmissionDenied => "admission-denied",
            Self::NotarizationFailed => "notarization-failed",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slot-created" => Ok(Self::SlotCreated),
            "booking-created" => Ok(Self::BookingCreated),
            "booking-confirmed" => Ok(Self::BookingConfirmed),
            "booking-rejected" => Ok(Self::BookingRejected),
            "booking-cancelled" => Ok(Self::BookingCancelled),
            "admission-granted" => Ok(Self::AdmissionGranted),
            "admission-denied" => Ok(Self::AdmissionDenied),
            "notarization-failed" => Ok(Self::NotarizationFailed),
            other => Err(format!("unknown audit action: {other}")),
        }
    }
}

/// Entity kind an audit entry refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    /// A booking
    Booking,
    /// A time slot
    Slot,
}

impl SubjectType {
    /// Stable lower-case encoding
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Slot => "slot",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking" => Ok(Self::Booking),
            "slot" => Ok(Self::Slot),
            other => Err(format!("unknown subject type: {other}")),
        }
    }
}

/// Immutable record of one state-changing action.
///
/// Entries are append-only and are never mutated or deleted. When the
/// external notarization ledger is unreachable this trail is the durable
/// source of truth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry identifier
    pub id: AuditEntryId,
    /// Principal that performed the action
    pub actor_id: ActorId,
    /// What happened
    pub action: AuditAction,
    /// Kind of entity the action applied to
    pub subject_type: SubjectType,
    /// Identifier of that entity
    pub subject_id: Uuid,
    /// Action-specific details
    pub details: serde_json::Value,
    /// When the action was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Query over the audit trail. Unset fields match everything; results are
/// ordered by `recorded_at` ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Only entries about this subject
    pub subject_id: Option<Uuid>,
    /// Only entries by this actor
    pub actor_id: Option<ActorId>,
    /// Only entries recorded at or after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only entries recorded at or before this instant
    pub to: Option<DateTime<Utc>>,
}

impl AuditQuery {
    /// Query for everything recorded about one subject
    #[must_use]
    pub const fn for_subject(subject_id: Uuid) -> Self {
        Self {
            subject_id: Some(subject_id),
            actor_id: None,
            from: None,
            to: None,
        }
    }

    /// Whether `entry` satisfies every set field of the query
    #[must_use]
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.subject_id.is_none_or(|s| entry.subject_id == s)
            && self.actor_id.is_none_or(|a| entry.actor_id == a)
            && self.from.is_none_or(|t| entry.recorded_at >= t)
            && self.to.is_none_or(|t| entry.recorded_at <= t)
    }
}

// ============================================================================
// Notarization
// ============================================================================

/// Receipt returned by the external immutable ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Opaque ledger reference for the written hash
    pub reference: String,
    /// When the ledger recorded the hash
    pub recorded_at: DateTime<Utc>,
}

/// Outcome of one notarization attempt.
///
/// A record exists for every attempt, successful or not, so a confirmed
/// event is never silently lost when the ledger is unreachable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotarizationRecord {
    /// Subject the hash covers (booking id for both confirmations and
    /// passages)
    pub subject_id: Uuid,
    /// Hex-encoded SHA-256 of the canonical event payload
    pub content_hash: String,
    /// Ledger receipt, present only on success
    pub receipt: Option<LedgerReceipt>,
    /// Whether the external write succeeded
    pub succeeded: bool,
    /// When the attempt was made
    pub attempted_at: DateTime<Utc>,
}

// ============================================================================
// Notifications
// ============================================================================

/// Kind of event fanned out to the notification collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A booking was created
    BookingCreated,
    /// A booking was confirmed
    BookingConfirmed,
    /// A booking was rejected
    BookingRejected,
    /// A booking was cancelled
    BookingCancelled,
    /// A truck was admitted through a gate
    GateAdmissionGranted,
}

impl EventKind {
    /// Stable kebab-case encoding
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BookingCreated => "booking-created",
            Self::BookingConfirmed => "booking-confirmed",
            Self::BookingRejected => "booking-rejected",
            Self::BookingCancelled => "booking-cancelled",
            Self::GateAdmissionGranted => "gate-admission-granted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget notice handed to the notification collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvent {
    /// What happened
    pub kind: EventKind,
    /// Event-specific payload
    pub payload: serde_json::Value,
}

impl EngineEvent {
    /// Creates a new `EngineEvent`
    #[must_use]
    pub const fn new(kind: EventKind, payload: serde_json::Value) -> Self {
        Self { kind, payload }
    }
}
