//! The world: an arena of entities and the operations that act on them.
//!
//! Every operation validates completely before it mutates, so a call that
//! returns an error has changed nothing. Callers identify themselves with a
//! [`Context`]; authority comes only from the capability tokens they pass.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use frontier_capability::{AdminCap, FrontierCapabilityError, OwnerCap, RootCap};
use frontier_common::{Address, Clock, Digest, EntityId, EventSink, Journal, SystemClock};
use frontier_request::{ApplicationRequest, Refused, RequestEngine};

use crate::{
    Character, Inventory, InventoryError, Item, Location, LocationProof, ProximityRequirement,
    Registry, Rejected, StatusError, StorageUnit, TenantItemId, WithdrawalRule, WorldConfig,
    WorldError, WorldEvent, storage_unit::Extension, verify_proximity,
};

/// Action name of requests opened by [`World::open_withdrawal`].
pub const WITHDRAW_ACTION: &str = "storage_unit::withdraw";

/// Who is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// Address the operation was submitted by.
    pub sender: Address,
}

impl Context {
    /// A call submitted by `sender`.
    pub fn new(sender: Address) -> Self {
        Self { sender }
    }
}

/// All state of one world.
#[derive(Debug)]
pub struct World<C = SystemClock> {
    id: EntityId,
    root: EntityId,
    config: WorldConfig,
    engine: RequestEngine,
    registry: Registry,
    servers: crate::ServerRegistry,
    characters: BTreeMap<EntityId, Character>,
    storage_units: BTreeMap<EntityId, StorageUnit>,
    journal: Journal<WorldEvent>,
    clock: C,
}

impl World<SystemClock> {
    /// Create a world that reads the wall clock.
    ///
    /// The returned [`RootCap`] is the only one this world will ever
    /// accept, directly or through the capabilities it issues.
    ///
    /// # Errors
    ///
    /// Fails only if the operating system cannot supply entropy for the
    /// root capability.
    pub fn genesis(config: WorldConfig) -> Result<(Self, RootCap), WorldError> {
        Self::genesis_with_clock(config, SystemClock)
    }
}

impl<C: Clock> World<C> {
    /// Create a world that reads deadlines against `clock`.
    pub fn genesis_with_clock(config: WorldConfig, clock: C) -> Result<(Self, RootCap), WorldError> {
        let id: EntityId = Digest::of_parts([b"world".as_slice(), config.world_name.as_bytes()]).into();
        let root = RootCap::genesis(id)?;
        tracing::debug!(world = %id, name = %config.world_name, "world created");

        let world = Self {
            id,
            root: *root.id(),
            engine: RequestEngine::new(config.protocol_version),
            registry: Registry::new(id),
            servers: crate::ServerRegistry::new(*root.id()),
            characters: BTreeMap::new(),
            storage_units: BTreeMap::new(),
            journal: Journal::new(),
            config,
            clock,
        };
        Ok((world, root))
    }

    /// Identity of the world, derived from its name.
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Configuration the world was created with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Clock deadlines are read against.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Engine that completes requests.
    pub fn engine(&self) -> &RequestEngine {
        &self.engine
    }

    /// Registry entity ids are claimed in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Servers trusted to sign proximity proofs.
    pub fn servers(&self) -> &crate::ServerRegistry {
        &self.servers
    }

    /// Events recorded so far.
    pub fn journal(&self) -> &Journal<WorldEvent> {
        &self.journal
    }

    /// Mutable access for a bridge that drains the journal.
    pub fn journal_mut(&mut self) -> &mut Journal<WorldEvent> {
        &mut self.journal
    }

    /// Look up a character.
    pub fn character(&self, id: &EntityId) -> Result<&Character, WorldError> {
        self.characters
            .get(id)
            .ok_or(WorldError::EntityNotFound { id: *id })
    }

    /// Look up a storage unit.
    pub fn storage_unit(&self, id: &EntityId) -> Result<&StorageUnit, WorldError> {
        self.storage_units
            .get(id)
            .ok_or(WorldError::EntityNotFound { id: *id })
    }

    /// Decode a proof, enforcing the configured data limit.
    pub fn decode_proof(&self, bytes: &[u8]) -> Result<LocationProof, WorldError> {
        Ok(LocationProof::from_bytes(bytes, self.config.max_proof_data_len)?)
    }

    // Capabilities and servers

    /// Issue an admin capability to `principal`.
    pub fn issue_admin(&mut self, root: &RootCap, principal: Address) -> Result<AdminCap, WorldError> {
        self.check_root(root)?;
        Ok(root.issue(principal, &mut self.journal))
    }

    /// Destroy an admin capability.
    pub fn revoke_admin(&mut self, root: &RootCap, admin: AdminCap) -> Result<(), WorldError> {
        self.check_root(root)?;
        Ok(root.revoke(admin, &mut self.journal)?)
    }

    /// Destroy an owner capability.
    pub fn revoke_owner<T>(
        &mut self,
        ctx: &Context,
        admin: &AdminCap,
        owner: OwnerCap<T>,
    ) -> Result<(), WorldError> {
        self.check_admin(ctx, admin)?;
        Ok(admin.revoke(&ctx.sender, owner, &mut self.journal)?)
    }

    /// Authorize `server` to sign proximity proofs.
    pub fn register_server(&mut self, root: &RootCap, server: Address) -> Result<(), WorldError> {
        Ok(self.servers.register(root, server, &mut self.journal)?)
    }

    /// Stop trusting `server`.
    pub fn remove_server(&mut self, root: &RootCap, server: &Address) -> Result<(), WorldError> {
        Ok(self.servers.remove(root, server, &mut self.journal)?)
    }

    // Entities

    /// Create a character for the player at `address`.
    ///
    /// The returned capability belongs to the player; the admin hands it
    /// over by moving it.
    pub fn create_character(
        &mut self,
        ctx: &Context,
        admin: &AdminCap,
        key: TenantItemId,
        address: Address,
        tribe_id: u32,
    ) -> Result<OwnerCap<Character>, WorldError> {
        self.check_admin(ctx, admin)?;

        let id = self.registry.claim(&key)?;
        let owner = admin.bind::<Character, _>(&ctx.sender, id, &mut self.journal)?;

        tracing::debug!(character = %id, %address, tribe_id, "character created");
        self.journal.emit(WorldEvent::CharacterCreated {
            character: id,
            key: key.clone(),
            address,
            tribe_id,
        });
        self.characters
            .insert(id, Character::new(id, key, address, tribe_id));
        Ok(owner)
    }

    /// Anchor a storage unit at `location_hash`. It starts `Anchored`.
    pub fn anchor_storage_unit(
        &mut self,
        ctx: &Context,
        admin: &AdminCap,
        key: TenantItemId,
        max_capacity: u64,
        location_hash: &[u8],
    ) -> Result<OwnerCap<StorageUnit>, WorldError> {
        self.check_admin(ctx, admin)?;

        let location = Location::new(location_hash)?;
        let id = self.registry.derive(&key)?;
        let inventory = Inventory::new(id, max_capacity)?;
        self.registry.claim(&key)?;
        let owner = admin.bind::<StorageUnit, _>(&ctx.sender, id, &mut self.journal)?;

        tracing::debug!(assembly = %id, max_capacity, "storage unit anchored");
        self.journal.emit(WorldEvent::StorageUnitAnchored {
            assembly: id,
            key: key.clone(),
            max_capacity,
            location_hash: *location.hash(),
        });
        self.storage_units
            .insert(id, StorageUnit::new(id, key, location, inventory));
        Ok(owner)
    }

    /// Destroy a storage unit and everything it holds.
    ///
    /// The unit's key stays claimed, so it can never be re-anchored.
    pub fn unanchor(&mut self, ctx: &Context, admin: &AdminCap, unit: &EntityId) -> Result<(), WorldError> {
        self.check_admin(ctx, admin)?;

        let unit = self
            .storage_units
            .remove(unit)
            .ok_or(WorldError::EntityNotFound { id: *unit })?;

        unit.status.unanchor(&mut self.journal);
        unit.inventory.destroy(&mut self.journal);
        for inventory in unit.owned.into_values() {
            inventory.destroy(&mut self.journal);
        }
        Ok(())
    }

    /// Move a storage unit's location commitment.
    pub fn update_location(
        &mut self,
        ctx: &Context,
        admin: &AdminCap,
        unit: &EntityId,
        location_hash: &[u8],
    ) -> Result<(), WorldError> {
        self.check_admin(ctx, admin)?;
        let unit = unit_mut(&mut self.storage_units, unit)?;

        unit.location.update(admin, &ctx.sender, location_hash)?;
        tracing::debug!(assembly = %unit.id, "location updated");
        self.journal.emit(WorldEvent::LocationUpdated {
            entity: unit.id,
            location_hash: *unit.location.hash(),
        });
        Ok(())
    }

    /// Bring a storage unit online.
    pub fn online(&mut self, unit: &EntityId, owner: &OwnerCap<StorageUnit>) -> Result<(), WorldError> {
        let unit = unit_mut(&mut self.storage_units, unit)?;
        authorize_owner(&self.root, unit, owner)?;
        Ok(unit.status.online(owner, &mut self.journal)?)
    }

    /// Take a storage unit offline.
    pub fn offline(&mut self, unit: &EntityId, owner: &OwnerCap<StorageUnit>) -> Result<(), WorldError> {
        let unit = unit_mut(&mut self.storage_units, unit)?;
        authorize_owner(&self.root, unit, owner)?;
        Ok(unit.status.offline(owner, &mut self.journal)?)
    }

    // Extensions

    /// Let code holding a `W` witness move items in and out of `unit`.
    ///
    /// Replaces any previously authorized extension.
    pub fn authorize_extension<W: 'static>(
        &mut self,
        unit: &EntityId,
        owner: &OwnerCap<StorageUnit>,
    ) -> Result<(), WorldError> {
        let unit = unit_mut(&mut self.storage_units, unit)?;
        authorize_owner(&self.root, unit, owner)?;

        let extension = Extension::of::<W>();
        unit.extension = Some(extension);
        tracing::debug!(assembly = %unit.id, extension = std::any::type_name::<W>(), "extension authorized");
        self.journal.emit(WorldEvent::ExtensionAuthorized {
            assembly: unit.id,
            extension: std::any::type_name::<W>(),
        });
        Ok(())
    }

    /// Deposit into the main inventory on behalf of extension `W`.
    pub fn deposit_item<W: 'static>(
        &mut self,
        unit: &EntityId,
        _witness: W,
        item: Item,
    ) -> Result<(), Rejected<WorldError>> {
        let unit = match extension_unit::<W>(&mut self.storage_units, unit) {
            Ok(unit) => unit,
            Err(error) => return Err(Rejected::new(item, error)),
        };
        unit.inventory
            .deposit(item, &mut self.journal)
            .map_err(|rejected| rejected.map_err(WorldError::from))
    }

    /// Withdraw from the main inventory on behalf of extension `W`.
    pub fn withdraw_item<W: 'static>(
        &mut self,
        unit: &EntityId,
        _witness: W,
        item_id: u64,
    ) -> Result<Item, WorldError> {
        let unit = extension_unit::<W>(&mut self.storage_units, unit)?;
        Ok(unit.inventory.withdraw(item_id, &mut self.journal)?)
    }

    /// Deposit into the inventory `unit` holds for `owner`, creating it on
    /// first use.
    pub fn deposit_to_owned<W: 'static>(
        &mut self,
        unit: &EntityId,
        _witness: W,
        owner: &EntityId,
        item: Item,
    ) -> Result<(), Rejected<WorldError>> {
        if let Err(error) = self.character(owner) {
            return Err(Rejected::new(item, error));
        }
        let unit = match extension_unit::<W>(&mut self.storage_units, unit) {
            Ok(unit) => unit,
            Err(error) => return Err(Rejected::new(item, error)),
        };

        let scope = unit.owned_scope(owner);
        let capacity = unit.inventory.max_capacity();
        let lift = |rejected: Rejected<InventoryError>| rejected.map_err(WorldError::from);

        match unit.owned.entry(*owner) {
            Entry::Occupied(mut entry) => entry.get_mut().deposit(item, &mut self.journal).map_err(lift),
            Entry::Vacant(entry) => {
                let mut inventory = match Inventory::new(scope, capacity) {
                    Ok(inventory) => inventory,
                    Err(error) => return Err(Rejected::new(item, error.into())),
                };
                inventory.deposit(item, &mut self.journal).map_err(lift)?;
                tracing::debug!(assembly = %unit.id, %owner, "owned inventory created");
                entry.insert(inventory);
                Ok(())
            }
        }
    }

    /// Withdraw from the inventory `unit` holds for `owner`.
    pub fn withdraw_from_owned<W: 'static>(
        &mut self,
        unit: &EntityId,
        _witness: W,
        owner: &EntityId,
        item_id: u64,
    ) -> Result<Item, WorldError> {
        let unit = extension_unit::<W>(&mut self.storage_units, unit)?;
        let inventory = unit
            .owned
            .get_mut(owner)
            .ok_or(WorldError::InventoryNotFound {
                assembly: unit.id,
                owner: *owner,
            })?;
        Ok(inventory.withdraw(item_id, &mut self.journal)?)
    }

    // Owner access

    /// Deposit into the main inventory as its owner, in person.
    pub fn deposit_by_owner(
        &mut self,
        ctx: &Context,
        unit: &EntityId,
        owner: &OwnerCap<StorageUnit>,
        proof: &LocationProof,
        item: Item,
    ) -> Result<(), Rejected<WorldError>> {
        if let Err(error) = self.check_owner_access(ctx, unit, owner, proof) {
            return Err(Rejected::new(item, error));
        }
        let unit = match unit_mut(&mut self.storage_units, unit) {
            Ok(unit) => unit,
            Err(error) => return Err(Rejected::new(item, error)),
        };
        unit.inventory
            .deposit(item, &mut self.journal)
            .map_err(|rejected| rejected.map_err(WorldError::from))
    }

    /// Withdraw from the main inventory as its owner, in person.
    pub fn withdraw_by_owner(
        &mut self,
        ctx: &Context,
        unit: &EntityId,
        owner: &OwnerCap<StorageUnit>,
        proof: &LocationProof,
        item_id: u64,
    ) -> Result<Item, WorldError> {
        self.check_owner_access(ctx, unit, owner, proof)?;
        let unit = unit_mut(&mut self.storage_units, unit)?;
        Ok(unit.inventory.withdraw(item_id, &mut self.journal)?)
    }

    // Request-gated withdrawal

    /// Require a proximity proof for request-gated withdrawals from `unit`.
    pub fn require_proximity(&mut self, unit: &EntityId, owner: &OwnerCap<StorageUnit>) -> Result<(), WorldError> {
        let unit = unit_mut(&mut self.storage_units, unit)?;
        authorize_owner(&self.root, unit, owner)?;
        if !unit.withdrawal_rules.contains(&WithdrawalRule::Proximity) {
            unit.withdrawal_rules.push(WithdrawalRule::Proximity);
        }
        Ok(())
    }

    /// Drop every withdrawal rule of `unit`.
    pub fn clear_withdrawal_rules(&mut self, unit: &EntityId, owner: &OwnerCap<StorageUnit>) -> Result<(), WorldError> {
        let unit = unit_mut(&mut self.storage_units, unit)?;
        authorize_owner(&self.root, unit, owner)?;
        unit.withdrawal_rules.clear();
        Ok(())
    }

    /// Open a withdrawal request carrying one requirement per rule of
    /// `unit`, stamped with the world's protocol version.
    pub fn open_withdrawal(&self, unit: &EntityId) -> Result<ApplicationRequest, WorldError> {
        let unit = self.storage_unit(unit)?;
        let mut builder = self.engine.request(WITHDRAW_ACTION).owner(unit.id);
        for rule in &unit.withdrawal_rules {
            builder = match rule {
                WithdrawalRule::Proximity => builder.requirement(ProximityRequirement {
                    location_hash: *unit.location.hash(),
                }),
            };
        }
        Ok(builder.build()?)
    }

    /// Discharge a [`ProximityRequirement`] of `request` as the caller.
    pub fn discharge_proximity(
        &self,
        ctx: &Context,
        request: &mut ApplicationRequest,
        proof: &LocationProof,
    ) -> Result<(), WorldError> {
        crate::discharge_proximity(request, proof, &self.servers, &ctx.sender, &self.clock)
    }

    /// Complete a withdrawal request and hand over the item.
    ///
    /// A failed call hands the request back in the [`Refused`], with every
    /// requirement discharged so far still discharged.
    pub fn withdraw_with_request(
        &mut self,
        unit: &EntityId,
        request: ApplicationRequest,
        item_id: u64,
    ) -> Result<Item, Refused<WorldError>> {
        if request.owner() != Some(unit) || request.action() != WITHDRAW_ACTION {
            let error = WorldError::RequestMismatch {
                expected: *unit,
                action: request.action().to_owned(),
            };
            return Err(Refused::new(request, error));
        }

        let target = match unit_mut(&mut self.storage_units, unit) {
            Ok(target) => target,
            Err(error) => return Err(Refused::new(request, error)),
        };
        if let Err(error) = target.status.require_online() {
            return Err(Refused::new(request, error.into()));
        }

        let prepared = self
            .engine
            .prepare(request)
            .map_err(|refused| refused.map_err(WorldError::from))?;
        let item = match target.inventory.withdraw(item_id, &mut self.journal) {
            Ok(item) => item,
            Err(error) => return Err(Refused::new(prepared.into_request(), error.into())),
        };

        let receipt = prepared.complete();
        tracing::debug!(action = receipt.action(), assembly = %unit, item_id, "withdrawal request completed");
        Ok(item)
    }

    // Game bridge

    /// Bring items from the game into a storage unit. Admin only; the unit
    /// must be online.
    #[allow(clippy::too_many_arguments)]
    pub fn game_item_to_chain(
        &mut self,
        ctx: &Context,
        admin: &AdminCap,
        unit: &EntityId,
        item_id: u64,
        type_id: u64,
        volume: u64,
        quantity: u32,
    ) -> Result<(), WorldError> {
        self.check_admin(ctx, admin)?;
        let unit = unit_mut(&mut self.storage_units, unit)?;
        unit.status.require_online()?;

        let location_hash = *unit.location.hash();
        Ok(unit
            .inventory
            .mint(item_id, type_id, volume, quantity, location_hash, &mut self.journal)?)
    }

    /// Send items from a storage unit back to the game. The owner must be
    /// at the unit.
    pub fn chain_item_to_game(
        &mut self,
        ctx: &Context,
        unit: &EntityId,
        owner: &OwnerCap<StorageUnit>,
        proof: &LocationProof,
        item_id: u64,
        quantity: u32,
    ) -> Result<(), WorldError> {
        let target = self.storage_unit(unit)?;
        authorize_owner(&self.root, target, owner)?;
        if self.config.burn_requires_online {
            target.status.require_online()?;
        }
        verify_proximity(&target.location, proof, &self.servers, &ctx.sender, &self.clock)?;

        let unit = unit_mut(&mut self.storage_units, unit)?;
        Ok(unit.inventory.burn(item_id, quantity, &mut self.journal)?)
    }

    fn check_root(&self, root: &RootCap) -> Result<(), FrontierCapabilityError> {
        check_lineage(&self.root, root.id(), root.id())
    }

    fn check_admin(&self, ctx: &Context, admin: &AdminCap) -> Result<(), FrontierCapabilityError> {
        check_lineage(&self.root, admin.id(), admin.root())?;
        admin.verify_sender(&ctx.sender)
    }

    fn check_owner_access(
        &self,
        ctx: &Context,
        unit: &EntityId,
        owner: &OwnerCap<StorageUnit>,
        proof: &LocationProof,
    ) -> Result<(), WorldError> {
        let unit = self.storage_unit(unit)?;
        authorize_owner(&self.root, unit, owner)?;
        unit.status.require_online()?;
        verify_proximity(&unit.location, proof, &self.servers, &ctx.sender, &self.clock)?;
        Ok(())
    }
}

fn unit_mut<'a>(
    units: &'a mut BTreeMap<EntityId, StorageUnit>,
    id: &EntityId,
) -> Result<&'a mut StorageUnit, WorldError> {
    units.get_mut(id).ok_or(WorldError::EntityNotFound { id: *id })
}

/// `root` is the world's root capability; anything else is forged or foreign.
fn check_lineage(
    root: &EntityId,
    capability: &EntityId,
    lineage: &EntityId,
) -> Result<(), FrontierCapabilityError> {
    if lineage == root {
        return Ok(());
    }
    tracing::warn!(%capability, expected = %root, actual = %lineage, "capability from a foreign root");
    Err(FrontierCapabilityError::foreign_root(*capability, *root, *lineage))
}

fn authorize_owner(
    root: &EntityId,
    unit: &StorageUnit,
    owner: &OwnerCap<StorageUnit>,
) -> Result<(), WorldError> {
    check_lineage(root, owner.id(), owner.root())?;
    if owner.is_authorized(&unit.id) {
        Ok(())
    } else {
        Err(StatusError::NotAuthorized { assembly: unit.id }.into())
    }
}

fn extension_unit<'a, W: 'static>(
    units: &'a mut BTreeMap<EntityId, StorageUnit>,
    id: &EntityId,
) -> Result<&'a mut StorageUnit, WorldError> {
    let unit = unit_mut(units, id)?;
    let admitted = unit
        .extension
        .is_some_and(|extension| extension.admits::<W>());
    if !admitted {
        return Err(WorldError::ExtensionNotAuthorized {
            assembly: unit.id,
            extension: std::any::type_name::<W>(),
        });
    }
    unit.status.require_online()?;
    Ok(unit)
}
