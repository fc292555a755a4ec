use frontier_capability::FrontierCapabilityError;
use frontier_common::{Address, EntityId};
use frontier_encoding::FrontierEncodingError;
use frontier_request::FrontierRequestError;
use frontier_signature::FrontierSignatureError;
use thiserror::Error;

use crate::Status;

/// Errors raised by an [`Inventory`](crate::Inventory).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// An inventory cannot hold nothing.
    #[error("Inventory capacity must be greater than zero")]
    InvalidCapacity,

    /// Item ids start at one.
    #[error("Item id must not be zero")]
    ItemIdEmpty,

    /// Type ids start at one.
    #[error("Item type id must not be zero")]
    TypeIdEmpty,

    /// Every unit of an item takes up some volume.
    #[error("Item volume must not be zero")]
    VolumeEmpty,

    /// Minting or burning nothing is refused rather than ignored.
    #[error("Quantity must not be zero")]
    ZeroQuantity,

    /// The operation would take used capacity past the maximum.
    #[error("Inventory {inventory} needs {required} more volume, {remaining} remaining")]
    InsufficientCapacity {
        /// Owner scope of the inventory.
        inventory: EntityId,
        /// Volume the operation would add (`u64::MAX` on overflow).
        required: u64,
        /// Volume still free.
        remaining: u64,
    },

    /// No item with that id is held.
    #[error("Item {item_id} not found in inventory {inventory}")]
    ItemNotFound {
        /// Owner scope of the inventory.
        inventory: EntityId,
        /// The item that was asked for.
        item_id: u64,
    },

    /// Fewer units are held than the operation asked for.
    #[error("Item {item_id}: requested {requested}, only {available} held")]
    InsufficientQuantity {
        /// The item that was asked for.
        item_id: u64,
        /// Units requested.
        requested: u32,
        /// Units held.
        available: u32,
    },

    /// A merge would overflow the item's quantity counter.
    #[error("Item {item_id} quantity would overflow")]
    QuantityOverflow {
        /// The item being merged into.
        item_id: u64,
    },

    /// Units of an item were merged into a stack of a different type.
    #[error("Item {item_id} holds type {held}, got type {incoming}")]
    TypeMismatch {
        /// The item being merged into.
        item_id: u64,
        /// Type of the stack already held.
        held: u64,
        /// Type of the incoming units.
        incoming: u64,
    },
}

/// Errors raised by the assembly lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// The presented owner capability is bound to a different entity.
    #[error("Owner capability does not govern assembly {assembly}")]
    NotAuthorized {
        /// The assembly whose status was being changed.
        assembly: EntityId,
    },

    /// The transition is not allowed from the current state.
    #[error("Assembly {assembly} is {actual}, expected {expected}")]
    InvalidStatus {
        /// The assembly whose status was being changed.
        assembly: EntityId,
        /// State the transition requires.
        expected: Status,
        /// State the assembly is in.
        actual: Status,
    },

    /// The operation requires the assembly to be online.
    #[error("Assembly {assembly} is not online")]
    NotOnline {
        /// The assembly that was offline.
        assembly: EntityId,
    },
}

/// Errors raised while deriving and claiming entity ids.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Natural keys carry a non-zero item id.
    #[error("Key item id must not be zero")]
    ItemIdEmpty,

    /// Natural keys are scoped by a non-empty tenant.
    #[error("Key tenant must not be empty")]
    TenantEmpty,

    /// The key has been claimed before. Claimed keys are never released.
    #[error("Entity {id} has already been claimed")]
    AlreadyClaimed {
        /// The derived id.
        id: EntityId,
    },

    /// The key could not be canonically encoded.
    #[error("Failed to encode key: {0}")]
    Encoding(#[from] FrontierEncodingError),
}

/// Errors raised by locations and the proximity gate.
#[derive(Debug, Error)]
pub enum LocationError {
    /// Location hashes are exactly 32 bytes.
    #[error("Location hash must be 32 bytes, got {actual}")]
    InvalidHashLength {
        /// Length of the hash that was presented.
        actual: usize,
    },

    /// The proof is signed by an address that is not a registered server.
    #[error("Server {server} is not authorized to sign proofs")]
    UnauthorizedServer {
        /// Address named in the proof.
        server: Address,
    },

    /// The proof attests to a different player than the caller.
    #[error("Proof is for player {player}, sent by {sender}")]
    UnverifiedSender {
        /// Address of the caller.
        sender: Address,
        /// Address named in the proof.
        player: Address,
    },

    /// The proof's target hash does not match the stored location.
    #[error("Proof target location does not match the stored location")]
    InvalidLocationHash,

    /// The attested distance is further than allowed.
    #[error("Attested distance {distance} exceeds {max_distance}")]
    InvalidDistance {
        /// Distance in the proof.
        distance: u64,
        /// Largest distance accepted.
        max_distance: u64,
    },

    /// The proof was presented at or after its deadline.
    #[error("Proof expired at {deadline_ms}, now {now_ms}")]
    DeadlineExpired {
        /// Deadline in the proof.
        deadline_ms: u64,
        /// Clock reading at verification.
        now_ms: u64,
    },

    /// The signature does not verify against the server address.
    #[error("Proof signature verification failed")]
    SignatureVerificationFailed,

    /// The proof carries more auxiliary data than configured.
    #[error("Proof data is {len} bytes, limit is {max}")]
    ProofDataTooLarge {
        /// Length of the data in the proof.
        len: usize,
        /// Configured limit.
        max: usize,
    },

    /// The proof could not be encoded or decoded.
    #[error("Proof encoding error: {0}")]
    Encoding(#[from] FrontierEncodingError),

    /// The signature blob is malformed.
    #[error("Proof signature error: {0}")]
    Signature(#[from] FrontierSignatureError),

    /// The caller is not entitled to change the location.
    #[error(transparent)]
    Capability(#[from] FrontierCapabilityError),
}

/// Every error a world operation can raise.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A capability was refused.
    #[error(transparent)]
    Capability(#[from] FrontierCapabilityError),

    /// A request could not be discharged or completed.
    #[error(transparent)]
    Request(#[from] FrontierRequestError),

    /// An inventory rejected a mutation.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// A lifecycle transition or gate failed.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// An id could not be derived or claimed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A location or proximity proof was rejected.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// The configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// No live entity has that id.
    #[error("Entity {id} not found")]
    EntityNotFound {
        /// The id that was looked up.
        id: EntityId,
    },

    /// The witness type is not the extension the owner authorized.
    #[error("Extension {extension} is not authorized on assembly {assembly}")]
    ExtensionNotAuthorized {
        /// The assembly being accessed.
        assembly: EntityId,
        /// Type name of the presented witness.
        extension: &'static str,
    },

    /// No per-owner inventory exists for that owner yet.
    #[error("Assembly {assembly} holds no inventory for {owner}")]
    InventoryNotFound {
        /// The assembly being accessed.
        assembly: EntityId,
        /// The owner whose inventory was asked for.
        owner: EntityId,
    },

    /// The request was opened for a different entity or action.
    #[error("Request for '{action}' does not belong to {expected}")]
    RequestMismatch {
        /// Entity the request had to be opened for.
        expected: EntityId,
        /// Action named in the request.
        action: String,
    },
}
