//! Capacity-bounded item ledger.
//!
//! An inventory holds stacks of items keyed by their game item id. Each
//! stack has a per-unit volume, and the inventory tracks the total volume it
//! holds against a fixed maximum:
//!
//! ```text
//!   used_capacity = Σ volume × quantity   ≤   max_capacity
//! ```
//!
//! Every operation validates completely before it changes anything, and
//! appends one event describing the change.

use std::collections::BTreeMap;
use std::fmt;

use frontier_common::{Digest, EntityId, EventSink};

use crate::{InventoryError, ItemDelta, WorldEvent};

/// A stack of identical game items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: EntityId,
    parent: EntityId,
    item_id: u64,
    type_id: u64,
    volume: u64,
    quantity: u32,
    location_hash: [u8; 32],
}

impl Item {
    /// Object identity, fresh for every mint.
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Owner scope of the inventory currently holding the item.
    pub fn parent(&self) -> &EntityId {
        &self.parent
    }

    /// Game-side item id, unique within an inventory.
    pub fn item_id(&self) -> u64 {
        self.item_id
    }

    /// Game-side item type.
    pub fn type_id(&self) -> u64 {
        self.type_id
    }

    /// Volume of a single unit.
    pub fn volume(&self) -> u64 {
        self.volume
    }

    /// Units in the stack.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Where the item was minted.
    pub fn location_hash(&self) -> &[u8; 32] {
        &self.location_hash
    }

    /// Volume of the whole stack.
    pub fn total_volume(&self) -> Option<u64> {
        self.volume.checked_mul(u64::from(self.quantity))
    }
}

/// A rejected deposit, handing the item back to the caller.
#[derive(Debug)]
pub struct Rejected<E> {
    /// The item that was not deposited.
    pub item: Item,
    /// Why it was rejected.
    pub error: E,
}

impl<E> Rejected<E> {
    /// Pair `item` with the reason it was rejected.
    pub fn new(item: Item, error: E) -> Self {
        Self { item, error }
    }

    /// Take the item back.
    pub fn into_item(self) -> Item {
        self.item
    }

    /// Drop the item, keeping the reason.
    pub fn into_error(self) -> E {
        self.error
    }

    /// Convert the error, keeping the item.
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Rejected<F> {
        Rejected {
            item: self.item,
            error: f(self.error),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Rejected<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deposit of item {} rejected: {}", self.item.item_id, self.error)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for Rejected<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Items held on behalf of one owner scope.
#[derive(Debug)]
pub struct Inventory {
    owner: EntityId,
    max_capacity: u64,
    used_capacity: u64,
    items: BTreeMap<u64, Item>,
    minted: u64,
}

impl Inventory {
    /// An empty inventory able to hold `max_capacity` volume.
    pub fn new(owner: EntityId, max_capacity: u64) -> Result<Self, InventoryError> {
        if max_capacity == 0 {
            return Err(InventoryError::InvalidCapacity);
        }
        Ok(Self {
            owner,
            max_capacity,
            used_capacity: 0,
            items: BTreeMap::new(),
            minted: 0,
        })
    }

    /// Owner scope the inventory holds items for.
    pub fn owner(&self) -> &EntityId {
        &self.owner
    }

    /// Total volume the inventory can hold.
    pub fn max_capacity(&self) -> u64 {
        self.max_capacity
    }

    /// Volume currently held.
    pub fn used_capacity(&self) -> u64 {
        self.used_capacity
    }

    /// Volume still free.
    pub fn remaining_capacity(&self) -> u64 {
        self.max_capacity - self.used_capacity
    }

    /// Whether a stack of `item_id` is held.
    pub fn contains(&self, item_id: u64) -> bool {
        self.items.contains_key(&item_id)
    }

    /// Units held of `item_id`, zero if absent.
    pub fn quantity_of(&self, item_id: u64) -> u32 {
        self.items.get(&item_id).map_or(0, Item::quantity)
    }

    /// The stack of `item_id`, if held.
    pub fn item(&self, item_id: u64) -> Option<&Item> {
        self.items.get(&item_id)
    }

    /// Held items in item id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Number of stacks held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Create `quantity` units of `item_id`.
    ///
    /// If the item is already held the units are merged into it. The
    /// incoming `type_id` must match the held stack, while `volume` is
    /// ignored: the existing stack's unit volume is what counts against
    /// capacity.
    ///
    /// Whether the holder is allowed to mint (online, authorized) is decided
    /// by the caller before this is reached.
    pub fn mint(
        &mut self,
        item_id: u64,
        type_id: u64,
        volume: u64,
        quantity: u32,
        location_hash: [u8; 32],
        events: &mut impl EventSink<WorldEvent>,
    ) -> Result<(), InventoryError> {
        if item_id == 0 {
            return Err(InventoryError::ItemIdEmpty);
        }
        if type_id == 0 {
            return Err(InventoryError::TypeIdEmpty);
        }
        if volume == 0 {
            return Err(InventoryError::VolumeEmpty);
        }
        if quantity == 0 {
            return Err(InventoryError::ZeroQuantity);
        }

        let used_before = self.used_capacity;
        let (quantity_before, unit_volume) = match self.items.get(&item_id) {
            Some(existing) => {
                check_type(existing, type_id)?;
                (existing.quantity, existing.volume)
            }
            None => (0, volume),
        };
        let quantity_after = quantity_before
            .checked_add(quantity)
            .ok_or(InventoryError::QuantityOverflow { item_id })?;
        let added = self.required(unit_volume, quantity)?;

        let owner = self.owner;
        let held = self.items.get(&item_id).map(|existing| existing.id);
        let id = match held {
            Some(id) => id,
            None => self.next_item_id(item_id),
        };
        let item = self.items.entry(item_id).or_insert_with(|| Item {
            id,
            parent: owner,
            item_id,
            type_id,
            volume,
            quantity: 0,
            location_hash,
        });
        item.quantity = quantity_after;

        let delta = ItemDelta {
            inventory: self.owner,
            item: item.id,
            item_id,
            type_id: item.type_id,
            quantity_before,
            quantity_after,
            used_before,
            used_after: used_before + added,
        };
        self.used_capacity += added;

        tracing::debug!(inventory = %self.owner, item_id, quantity, used = self.used_capacity, "items minted");
        events.emit(WorldEvent::ItemMinted(delta));
        Ok(())
    }

    /// Destroy `quantity` units of `item_id`.
    ///
    /// Burning every unit removes the item and its identity. Burning fewer
    /// leaves the stack in place with the remainder.
    pub fn burn(
        &mut self,
        item_id: u64,
        quantity: u32,
        events: &mut impl EventSink<WorldEvent>,
    ) -> Result<(), InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::ZeroQuantity);
        }

        let owner = self.owner;
        let used_before = self.used_capacity;
        let item = self
            .items
            .get_mut(&item_id)
            .ok_or(InventoryError::ItemNotFound {
                inventory: owner,
                item_id,
            })?;
        if quantity > item.quantity {
            return Err(InventoryError::InsufficientQuantity {
                item_id,
                requested: quantity,
                available: item.quantity,
            });
        }

        // Never exceeds what was reserved when these units arrived.
        let released = item.volume * u64::from(quantity);
        let quantity_before = item.quantity;
        item.quantity -= quantity;
        self.used_capacity -= released;

        let delta = ItemDelta {
            inventory: owner,
            item: item.id,
            item_id,
            type_id: item.type_id,
            quantity_before,
            quantity_after: item.quantity,
            used_before,
            used_after: self.used_capacity,
        };

        if item.quantity == 0 {
            self.items.remove(&item_id);
            tracing::debug!(inventory = %owner, item_id, "item burned");
            events.emit(WorldEvent::ItemBurned(delta));
        } else {
            tracing::debug!(inventory = %owner, item_id, remaining = delta.quantity_after, "item partially burned");
            events.emit(WorldEvent::ItemQuantityChanged(delta));
        }
        Ok(())
    }

    /// Check whether `item` could be deposited, without depositing it.
    pub fn check_deposit(&self, item: &Item) -> Result<(), InventoryError> {
        self.admit(item).map(|_| ())
    }

    /// Take in an item withdrawn from another inventory.
    ///
    /// A stack with the same item id merges into the one already held. On
    /// failure the item is handed back untouched.
    pub fn deposit(
        &mut self,
        mut item: Item,
        events: &mut impl EventSink<WorldEvent>,
    ) -> Result<(), Rejected<InventoryError>> {
        let added = match self.admit(&item) {
            Ok(added) => added,
            Err(error) => return Err(Rejected::new(item, error)),
        };

        let used_before = self.used_capacity;
        let item_id = item.item_id;
        let quantity_before = self.quantity_of(item_id);

        let incoming = item.quantity;
        item.parent = self.owner;
        // A merged stack keeps the identity of the one already held.
        let held = self
            .items
            .entry(item_id)
            .and_modify(|existing| existing.quantity += incoming)
            .or_insert(item);

        let delta = ItemDelta {
            inventory: self.owner,
            item: held.id,
            item_id,
            type_id: held.type_id,
            quantity_before,
            quantity_after: held.quantity,
            used_before,
            used_after: used_before + added,
        };
        self.used_capacity += added;

        tracing::debug!(inventory = %self.owner, item_id, used = self.used_capacity, "item deposited");
        events.emit(WorldEvent::ItemDeposited(delta));
        Ok(())
    }

    /// Remove the whole stack of `item_id` and hand it to the caller.
    pub fn withdraw(
        &mut self,
        item_id: u64,
        events: &mut impl EventSink<WorldEvent>,
    ) -> Result<Item, InventoryError> {
        let item = self
            .items
            .remove(&item_id)
            .ok_or(InventoryError::ItemNotFound {
                inventory: self.owner,
                item_id,
            })?;

        let used_before = self.used_capacity;
        self.used_capacity -= item.volume * u64::from(item.quantity);

        tracing::debug!(inventory = %self.owner, item_id, used = self.used_capacity, "item withdrawn");
        events.emit(WorldEvent::ItemWithdrawn(ItemDelta {
            inventory: self.owner,
            item: item.id,
            item_id,
            type_id: item.type_id,
            quantity_before: item.quantity,
            quantity_after: 0,
            used_before,
            used_after: self.used_capacity,
        }));
        Ok(item)
    }

    /// Destroy the inventory and everything in it.
    pub fn destroy(self, events: &mut impl EventSink<WorldEvent>) {
        let mut used = self.used_capacity;
        for item in self.items.into_values() {
            let used_before = used;
            used -= item.volume * u64::from(item.quantity);
            events.emit(WorldEvent::ItemDestroyed(ItemDelta {
                inventory: self.owner,
                item: item.id,
                item_id: item.item_id,
                type_id: item.type_id,
                quantity_before: item.quantity,
                quantity_after: 0,
                used_before,
                used_after: used,
            }));
        }
        tracing::debug!(inventory = %self.owner, "inventory destroyed");
    }

    fn required(&self, unit_volume: u64, quantity: u32) -> Result<u64, InventoryError> {
        let remaining = self.remaining_capacity();
        let required = unit_volume.checked_mul(u64::from(quantity));
        match required {
            Some(required) if required <= remaining => Ok(required),
            required => Err(InventoryError::InsufficientCapacity {
                inventory: self.owner,
                required: required.unwrap_or(u64::MAX),
                remaining,
            }),
        }
    }

    /// Volume `item` would add, if it may be deposited at all.
    fn admit(&self, item: &Item) -> Result<u64, InventoryError> {
        let unit_volume = match self.items.get(&item.item_id) {
            Some(held) => {
                check_type(held, item.type_id)?;
                held.quantity
                    .checked_add(item.quantity)
                    .ok_or(InventoryError::QuantityOverflow {
                        item_id: item.item_id,
                    })?;
                held.volume
            }
            None => item.volume,
        };
        self.required(unit_volume, item.quantity)
    }

    fn next_item_id(&mut self, item_id: u64) -> EntityId {
        let nonce = self.minted;
        self.minted += 1;
        Digest::of_parts([
            self.owner.as_ref(),
            item_id.to_le_bytes().as_slice(),
            nonce.to_le_bytes().as_slice(),
        ])
        .into()
    }
}

fn check_type(held: &Item, incoming: u64) -> Result<(), InventoryError> {
    if held.type_id == incoming {
        return Ok(());
    }
    Err(InventoryError::TypeMismatch {
        item_id: held.item_id,
        held: held.type_id,
        incoming,
    })
}
