//! Locations and the proximity gate.
//!
//! The world never learns where anything is. An assembly stores an opaque
//! 32-byte commitment to its position, and a trusted off-chain server
//! vouches for spatial facts by signing a [`LocationProofMessage`]:
//!
//! ```text
//!  ┌────────────────────── LocationProofMessage ──────────────────────┐
//!  │ server │ player │ source id │ source hash │ target id │ target   │
//!  │ (32B)  │ (32B)  │  (32B)    │  (len‖…)    │  (32B)    │ hash     │
//!  ├────────┴────────┴───────────┴─────────────┴───────────┴──────────┤
//!  │ distance (u64 LE) │ data (len‖…) │ deadline_ms (u64 LE)           │
//!  └──────────────────────────────────────────────────────────────────┘
//!                         ‖ signature blob (len‖flag‖sig‖pk)
//! ```
//!
//! A proof is accepted only if every check passes, in this order:
//!
//! 1. the signer is a registered server,
//! 2. the proof names the caller as the player,
//! 3. the target hash equals the stored location,
//! 4. (distance variant) the distance is within bounds,
//! 5. the deadline has not passed,
//! 6. the signature verifies.
//!
//! Proofs are not consumed: the deadline is the only replay bound, so a
//! proof may be presented any number of times until it expires.

use std::any::type_name;
use std::collections::BTreeSet;

use frontier_capability::{AdminCap, FrontierCapabilityError, RootCap};
use frontier_common::{Address, Clock, EntityId, EventSink};
use frontier_encoding::{Decode, Decoder, Encode, FrontierEncodingError, to_bytes};
use frontier_request::{ApplicationRequest, FrontierRequestError};
use frontier_signature::{Signer, verify_signature};

use crate::{LocationError, WorldError, WorldEvent};

/// Length of a location commitment.
pub const LOCATION_HASH_LEN: usize = 32;

/// An opaque commitment to where an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    hash: [u8; LOCATION_HASH_LEN],
}

impl Location {
    /// Wrap a location hash.
    ///
    /// # Errors
    ///
    /// [`LocationError::InvalidHashLength`] unless `hash` is 32 bytes.
    pub fn new(hash: &[u8]) -> Result<Self, LocationError> {
        let hash = <[u8; LOCATION_HASH_LEN]>::try_from(hash).map_err(|_| {
            LocationError::InvalidHashLength {
                actual: hash.len(),
            }
        })?;
        Ok(Self { hash })
    }

    /// The committed hash.
    pub fn hash(&self) -> &[u8; LOCATION_HASH_LEN] {
        &self.hash
    }

    /// Move the commitment. Only an admin may do this.
    pub fn update(
        &mut self,
        admin: &AdminCap,
        sender: &Address,
        hash: &[u8],
    ) -> Result<(), LocationError> {
        admin.verify_sender(sender)?;
        *self = Location::new(hash)?;
        Ok(())
    }
}

/// Whether two commitments name the same place.
pub fn verify_same_location(a: &Location, b: &Location) -> bool {
    a.hash == b.hash
}

/// The statement an off-chain server signs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationProofMessage {
    /// Server that attests the proof.
    pub server_address: Address,
    /// Player the proof is about.
    pub player_address: Address,
    /// Entity the player is at.
    pub source_structure_id: EntityId,
    /// Location commitment of the source.
    pub source_location_hash: Vec<u8>,
    /// Entity the player wants to act on.
    pub target_structure_id: EntityId,
    /// Location commitment of the target.
    pub target_location_hash: Vec<u8>,
    /// Distance between source and target, in game units.
    pub distance: u64,
    /// Free-form data for the consumer of the proof.
    pub data: Vec<u8>,
    /// Unix time in milliseconds after which the proof is void.
    pub deadline_ms: u64,
}

impl LocationProofMessage {
    /// Sign the message as `signer`.
    ///
    /// The signature covers the canonical encoding of the message. Nothing
    /// checks that `signer` is the message's `server_address`: a mismatch
    /// produces a proof that will never verify.
    pub fn sign(self, signer: &Signer) -> Result<LocationProof, LocationError> {
        let signature = signer.sign_message(&to_bytes(&self)?)?;
        Ok(LocationProof {
            message: self,
            signature,
        })
    }
}

impl Encode for LocationProofMessage {
    fn encode<W: std::io::Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        self.server_address.encode(writer)?;
        self.player_address.encode(writer)?;
        self.source_structure_id.encode(writer)?;
        self.source_location_hash.encode(writer)?;
        self.target_structure_id.encode(writer)?;
        self.target_location_hash.encode(writer)?;
        self.distance.encode(writer)?;
        self.data.encode(writer)?;
        self.deadline_ms.encode(writer)
    }
}

impl Decode for LocationProofMessage {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
        Ok(Self {
            server_address: Address::decode(decoder)?,
            player_address: Address::decode(decoder)?,
            source_structure_id: EntityId::decode(decoder)?,
            source_location_hash: decoder.read_bytes()?.to_vec(),
            target_structure_id: EntityId::decode(decoder)?,
            target_location_hash: decoder.read_bytes()?.to_vec(),
            distance: u64::decode(decoder)?,
            data: decoder.read_bytes()?.to_vec(),
            deadline_ms: u64::decode(decoder)?,
        })
    }
}

/// A signed [`LocationProofMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationProof {
    message: LocationProofMessage,
    signature: Vec<u8>,
}

impl LocationProof {
    /// Pair a message with a signature produced elsewhere.
    pub fn new(message: LocationProofMessage, signature: Vec<u8>) -> Self {
        Self { message, signature }
    }

    /// The signed statement.
    pub fn message(&self) -> &LocationProofMessage {
        &self.message
    }

    /// The `flag ‖ signature ‖ public_key` blob.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Canonical encoding: the message followed by the length-prefixed
    /// signature blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LocationError> {
        let mut bytes = to_bytes(&self.message)?;
        self.signature.encode(&mut bytes)?;
        Ok(bytes)
    }

    /// Decode a proof produced by [`LocationProof::to_bytes`].
    ///
    /// # Errors
    ///
    /// - [`LocationError::Encoding`] if the bytes are truncated, malformed
    ///   or followed by trailing data.
    /// - [`LocationError::ProofDataTooLarge`] if the auxiliary data is
    ///   longer than `max_data_len`.
    pub fn from_bytes(bytes: &[u8], max_data_len: usize) -> Result<Self, LocationError> {
        let mut decoder = Decoder::new(bytes);
        let message = LocationProofMessage::decode(&mut decoder)?;
        let signature = decoder.read_bytes()?.to_vec();
        decoder.finish()?;

        if message.data.len() > max_data_len {
            return Err(LocationError::ProofDataTooLarge {
                len: message.data.len(),
                max: max_data_len,
            });
        }
        Ok(Self { message, signature })
    }
}

/// Addresses allowed to sign proximity proofs.
///
/// Only the root capability the registry was created for may change it.
#[derive(Debug)]
pub struct ServerRegistry {
    root: EntityId,
    servers: BTreeSet<Address>,
}

impl ServerRegistry {
    /// An empty registry governed by the root capability with id `root`.
    pub fn new(root: EntityId) -> Self {
        Self {
            root,
            servers: BTreeSet::new(),
        }
    }

    /// Whether `server` may sign proofs.
    pub fn contains(&self, server: &Address) -> bool {
        self.servers.contains(server)
    }

    /// Registered servers in address order.
    pub fn servers(&self) -> impl Iterator<Item = &Address> {
        self.servers.iter()
    }

    /// Authorize `server` to sign proofs.
    pub fn register(
        &mut self,
        root: &RootCap,
        server: Address,
        events: &mut impl EventSink<WorldEvent>,
    ) -> Result<(), FrontierCapabilityError> {
        self.check_root(root)?;
        if self.servers.insert(server) {
            tracing::debug!(%server, "server registered");
            events.emit(WorldEvent::ServerRegistered { server });
        }
        Ok(())
    }

    /// Withdraw `server`'s authorization. Proofs it signed stop verifying
    /// immediately.
    pub fn remove(
        &mut self,
        root: &RootCap,
        server: &Address,
        events: &mut impl EventSink<WorldEvent>,
    ) -> Result<(), FrontierCapabilityError> {
        self.check_root(root)?;
        if self.servers.remove(server) {
            tracing::debug!(%server, "server removed");
            events.emit(WorldEvent::ServerRemoved { server: *server });
        }
        Ok(())
    }

    fn check_root(&self, root: &RootCap) -> Result<(), FrontierCapabilityError> {
        if root.id() == &self.root {
            return Ok(());
        }
        tracing::warn!(expected = %self.root, actual = %root.id(), "server registry change by a foreign root");
        Err(FrontierCapabilityError::foreign_root(*root.id(), self.root, *root.id()))
    }
}

/// Verify that `sender` was near `location` according to a registered
/// server.
pub fn verify_proximity<C: Clock>(
    location: &Location,
    proof: &LocationProof,
    servers: &ServerRegistry,
    sender: &Address,
    clock: &C,
) -> Result<(), LocationError> {
    check_proof(location, proof, servers, sender, None, clock)
}

/// Like [`verify_proximity`], additionally bounding the attested distance.
pub fn verify_distance<C: Clock>(
    location: &Location,
    proof: &LocationProof,
    servers: &ServerRegistry,
    sender: &Address,
    max_distance: u64,
    clock: &C,
) -> Result<(), LocationError> {
    check_proof(location, proof, servers, sender, Some(max_distance), clock)
}

/// Decode a proof and run [`verify_proximity`] on it.
pub fn verify_proximity_proof_from_bytes<C: Clock>(
    location: &Location,
    bytes: &[u8],
    servers: &ServerRegistry,
    sender: &Address,
    max_data_len: usize,
    clock: &C,
) -> Result<LocationProof, LocationError> {
    let proof = LocationProof::from_bytes(bytes, max_data_len)?;
    verify_proximity(location, &proof, servers, sender, clock)?;
    Ok(proof)
}

fn check_proof<C: Clock>(
    location: &Location,
    proof: &LocationProof,
    servers: &ServerRegistry,
    sender: &Address,
    max_distance: Option<u64>,
    clock: &C,
) -> Result<(), LocationError> {
    let message = &proof.message;

    if !servers.contains(&message.server_address) {
        tracing::warn!(server = %message.server_address, "proof from unregistered server");
        return Err(LocationError::UnauthorizedServer {
            server: message.server_address,
        });
    }

    if &message.player_address != sender {
        tracing::warn!(player = %message.player_address, %sender, "proof presented by another player");
        return Err(LocationError::UnverifiedSender {
            sender: *sender,
            player: message.player_address,
        });
    }

    if message.target_location_hash.as_slice() != location.hash.as_slice() {
        tracing::warn!(target = %message.target_structure_id, "proof target does not match location");
        return Err(LocationError::InvalidLocationHash);
    }

    if let Some(max_distance) = max_distance {
        if message.distance > max_distance {
            return Err(LocationError::InvalidDistance {
                distance: message.distance,
                max_distance,
            });
        }
    }

    let now_ms = clock.now_ms();
    if now_ms >= message.deadline_ms {
        tracing::warn!(deadline_ms = message.deadline_ms, now_ms, "proof expired");
        return Err(LocationError::DeadlineExpired {
            deadline_ms: message.deadline_ms,
            now_ms,
        });
    }

    if !verify_signature(&to_bytes(message)?, &proof.signature, &message.server_address)? {
        tracing::warn!(server = %message.server_address, "proof signature rejected");
        return Err(LocationError::SignatureVerificationFailed);
    }

    tracing::trace!(player = %sender, target = %message.target_structure_id, "proximity verified");
    Ok(())
}

/// A request requirement discharged by a proximity proof to `location_hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityRequirement {
    /// Location the proof must point at.
    pub location_hash: [u8; LOCATION_HASH_LEN],
}

/// Discharge the first [`ProximityRequirement`] of `request` with `proof`.
///
/// The proof is checked against the requirement's location before the
/// requirement is removed, so a rejected proof leaves the request as it was.
pub fn discharge_proximity<C: Clock>(
    request: &mut ApplicationRequest,
    proof: &LocationProof,
    servers: &ServerRegistry,
    sender: &Address,
    clock: &C,
) -> Result<(), WorldError> {
    let location = request
        .requirement::<ProximityRequirement>()
        .map(|requirement| Location {
            hash: requirement.location_hash,
        })
        .ok_or(FrontierRequestError::RequirementNotFound {
            type_name: type_name::<ProximityRequirement>(),
        })?;

    verify_proximity(&location, proof, servers, sender, clock)?;
    request.complete_requirement::<ProximityRequirement>()?;
    Ok(())
}
