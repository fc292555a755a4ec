use frontier_capability::{Denial, FrontierCapabilityError};
use frontier_common::{Address, EntityId, FixedClock};
use frontier_signature::{SignatureScheme, Signer};
use frontier_world::{
    AdminCap, Context, InventoryError, LocationError, LocationProof, LocationProofMessage,
    OwnerCap, RegistryError, RootCap, Status, StatusError, StorageUnit, TenantItemId, World,
    WorldConfig, WorldError, WorldEvent,
};
use pretty_assertions::assert_eq;

const HERE: [u8; 32] = [0x42; 32];
const NOW: u64 = 1_700_000_000_000;

struct Fixture {
    world: World<FixedClock>,
    _root: RootCap,
    admin: AdminCap,
    operator: Context,
    player: Context,
    server: Signer,
    unit: EntityId,
    owner: OwnerCap<StorageUnit>,
}

impl Fixture {
    fn new(config: WorldConfig, max_capacity: u64) -> anyhow::Result<Self> {
        let (mut world, root) = World::genesis_with_clock(config, FixedClock::new(NOW))?;
        let operator = Context::new(Address::new([1; 32]));
        let player = Context::new(Address::new([2; 32]));
        let server = Signer::from_seed(SignatureScheme::Ed25519, [0x51; 32])?;

        let admin = world.issue_admin(&root, operator.sender)?;
        world.register_server(&root, server.address())?;

        let key = TenantItemId::new(1000004145107, "stillness")?;
        let owner = world.anchor_storage_unit(&operator, &admin, key, max_capacity, &HERE)?;
        let unit = *owner.bound_entity();

        Ok(Self {
            world,
            _root: root,
            admin,
            operator,
            player,
            server,
            unit,
            owner,
        })
    }

    fn online(config: WorldConfig, max_capacity: u64) -> anyhow::Result<Self> {
        let mut fixture = Self::new(config, max_capacity)?;
        fixture.world.online(&fixture.unit, &fixture.owner)?;
        Ok(fixture)
    }

    fn proof(&self) -> anyhow::Result<LocationProof> {
        Ok(LocationProofMessage {
            server_address: self.server.address(),
            player_address: self.player.sender,
            source_structure_id: EntityId::new([9; 32]),
            source_location_hash: HERE.to_vec(),
            target_structure_id: self.unit,
            target_location_hash: HERE.to_vec(),
            distance: 0,
            data: Vec::new(),
            deadline_ms: NOW + 60_000,
        }
        .sign(&self.server)?)
    }

    fn mint(&mut self, item_id: u64, type_id: u64, volume: u64, quantity: u32) -> Result<(), WorldError> {
        self.world.game_item_to_chain(
            &self.operator,
            &self.admin,
            &self.unit,
            item_id,
            type_id,
            volume,
            quantity,
        )
    }
}

#[test_log::test]
fn it_fills_and_drains_a_storage_unit() -> anyhow::Result<()> {
    let mut f = Fixture::online(WorldConfig::default(), 1_000)?;

    f.mint(1000004145107, 88069, 100, 10)?;
    let inventory = f.world.storage_unit(&f.unit)?.inventory();
    assert_eq!(inventory.used_capacity(), 1_000);
    assert_eq!(inventory.remaining_capacity(), 0);

    let proof = f.proof()?;
    f.world
        .chain_item_to_game(&f.player, &f.unit, &f.owner, &proof, 1000004145107, 10)?;
    let inventory = f.world.storage_unit(&f.unit)?.inventory();
    assert_eq!(inventory.used_capacity(), 0);
    assert!(!inventory.contains(1000004145107));

    assert!(matches!(
        f.mint(1000004145107, 88069, 100, 15),
        Err(WorldError::Inventory(InventoryError::InsufficientCapacity {
            required: 1_500,
            remaining: 1_000,
            ..
        }))
    ));
    Ok(())
}

#[test]
fn it_only_mints_into_an_online_unit() -> anyhow::Result<()> {
    let mut f = Fixture::new(WorldConfig::default(), 1_000)?;
    assert!(matches!(
        f.mint(1, 1, 1, 1),
        Err(WorldError::Status(StatusError::NotOnline { .. }))
    ));
    assert!(f.world.storage_unit(&f.unit)?.inventory().is_empty());
    Ok(())
}

#[test]
fn it_walks_the_status_machine() -> anyhow::Result<()> {
    let mut f = Fixture::new(WorldConfig::default(), 1_000)?;

    assert!(matches!(
        f.world.offline(&f.unit, &f.owner),
        Err(WorldError::Status(StatusError::InvalidStatus {
            expected: Status::Online,
            actual: Status::Anchored,
            ..
        }))
    ));

    f.world.online(&f.unit, &f.owner)?;
    assert!(matches!(
        f.world.online(&f.unit, &f.owner),
        Err(WorldError::Status(StatusError::InvalidStatus { .. }))
    ));

    f.world.offline(&f.unit, &f.owner)?;
    assert_eq!(f.world.storage_unit(&f.unit)?.status().state(), Status::Anchored);
    Ok(())
}

#[test_log::test]
fn it_forgets_an_unanchored_unit_but_not_its_key() -> anyhow::Result<()> {
    let mut f = Fixture::online(WorldConfig::default(), 1_000)?;
    f.mint(7, 1, 10, 2)?;
    f.world.unanchor(&f.operator, &f.admin, &f.unit)?;

    assert!(matches!(
        f.world.online(&f.unit, &f.owner),
        Err(WorldError::EntityNotFound { id }) if id == f.unit
    ));
    assert!(matches!(
        f.mint(7, 1, 10, 1),
        Err(WorldError::EntityNotFound { .. })
    ));

    let events = f.world.journal().events();
    assert!(events.iter().any(|event| matches!(
        event,
        WorldEvent::StatusChanged { to: Status::Destroyed, .. }
    )));
    assert!(matches!(events.last(), Some(WorldEvent::ItemDestroyed(_))));

    let key = TenantItemId::new(1000004145107, "stillness")?;
    assert!(matches!(
        f.world.anchor_storage_unit(&f.operator, &f.admin, key, 1_000, &HERE),
        Err(WorldError::Registry(RegistryError::AlreadyClaimed { .. }))
    ));
    Ok(())
}

#[test]
fn it_refuses_an_admin_from_another_principal() -> anyhow::Result<()> {
    let mut f = Fixture::online(WorldConfig::default(), 1_000)?;
    let stranger = f.player;
    assert!(matches!(
        f.world
            .game_item_to_chain(&stranger, &f.admin, &f.unit, 1, 1, 1, 1),
        Err(WorldError::Capability(_))
    ));
    Ok(())
}

#[test]
fn it_refuses_an_admin_from_another_world() -> anyhow::Result<()> {
    let mut f = Fixture::online(WorldConfig::default(), 1_000)?;
    let config = WorldConfig {
        world_name: "elsewhere".into(),
        ..WorldConfig::default()
    };
    let (mut other, other_root) = World::genesis_with_clock(config, FixedClock::new(NOW))?;
    let foreign_admin = other.issue_admin(&other_root, f.operator.sender)?;

    assert!(matches!(
        f.world
            .game_item_to_chain(&f.operator, &foreign_admin, &f.unit, 1, 1, 1, 1),
        Err(WorldError::Capability(_))
    ));
    assert!(f.world.issue_admin(&other_root, f.operator.sender).is_err());
    Ok(())
}

#[test_log::test]
fn it_refuses_a_root_minted_again_for_the_same_world() -> anyhow::Result<()> {
    let mut f = Fixture::online(WorldConfig::default(), 1_000)?;
    let attacker = Context::new(Address::new([0xA7; 32]));
    let forged = RootCap::genesis(*f.world.id())?;
    assert_eq!(forged.world(), f.world.id());

    assert!(matches!(
        f.world.issue_admin(&forged, attacker.sender),
        Err(WorldError::Capability(FrontierCapabilityError::Unauthorized {
            denial: Denial::ForeignRoot { .. },
            ..
        }))
    ));
    assert!(f.world.register_server(&forged, attacker.sender).is_err());
    assert!(!f.world.servers().contains(&attacker.sender));

    // Capabilities issued by the forged root outside the world are inert.
    let mut events = Vec::<WorldEvent>::new();
    let forged_admin = forged.issue(attacker.sender, &mut events);
    assert!(matches!(
        f.world
            .game_item_to_chain(&attacker, &forged_admin, &f.unit, 77, 1, 1, 1),
        Err(WorldError::Capability(_))
    ));
    assert_eq!(f.world.storage_unit(&f.unit)?.inventory().quantity_of(77), 0);

    let forged_owner = forged_admin.bind::<StorageUnit, _>(&attacker.sender, f.unit, &mut events)?;
    assert!(forged_owner.is_authorized(&f.unit));
    assert!(matches!(
        f.world.offline(&f.unit, &forged_owner),
        Err(WorldError::Capability(_))
    ));
    assert!(f.world.storage_unit(&f.unit)?.status().is_online());
    Ok(())
}

#[test]
fn it_lets_the_owner_move_items_in_person() -> anyhow::Result<()> {
    let mut f = Fixture::online(WorldConfig::default(), 1_000)?;
    f.mint(5, 2, 10, 4)?;
    let proof = f.proof()?;

    let item = f
        .world
        .withdraw_by_owner(&f.player, &f.unit, &f.owner, &proof, 5)?;
    assert_eq!(item.quantity(), 4);
    assert_eq!(f.world.storage_unit(&f.unit)?.inventory().used_capacity(), 0);

    f.world
        .deposit_by_owner(&f.player, &f.unit, &f.owner, &proof, item)?;
    assert_eq!(f.world.storage_unit(&f.unit)?.inventory().quantity_of(5), 4);
    Ok(())
}

#[test]
fn it_hands_back_items_when_owner_access_is_refused() -> anyhow::Result<()> {
    let mut f = Fixture::online(WorldConfig::default(), 1_000)?;
    f.mint(5, 2, 10, 4)?;
    let proof = f.proof()?;
    let item = f
        .world
        .withdraw_by_owner(&f.player, &f.unit, &f.owner, &proof, 5)?;

    // The operator is not the player the proof was issued to.
    let rejected = f
        .world
        .deposit_by_owner(&f.operator, &f.unit, &f.owner, &proof, item)
        .expect_err("proof names another player");
    assert!(matches!(
        rejected.error,
        WorldError::Location(LocationError::UnverifiedSender { .. })
    ));
    assert_eq!(rejected.item.quantity(), 4);
    Ok(())
}

#[test]
fn it_rejects_an_expired_proof() -> anyhow::Result<()> {
    let mut f = Fixture::online(WorldConfig::default(), 1_000)?;
    f.mint(5, 2, 10, 4)?;
    let proof = f.proof()?;
    f.world.clock().advance(60_000);

    assert!(matches!(
        f.world
            .withdraw_by_owner(&f.player, &f.unit, &f.owner, &proof, 5),
        Err(WorldError::Location(LocationError::DeadlineExpired { .. }))
    ));
    assert_eq!(f.world.storage_unit(&f.unit)?.inventory().quantity_of(5), 4);
    Ok(())
}

#[test]
fn it_burns_offline_only_when_configured() -> anyhow::Result<()> {
    let strict = WorldConfig::default();
    let mut f = Fixture::online(strict, 1_000)?;
    f.mint(5, 2, 10, 4)?;
    f.world.offline(&f.unit, &f.owner)?;
    let proof = f.proof()?;
    assert!(matches!(
        f.world
            .chain_item_to_game(&f.player, &f.unit, &f.owner, &proof, 5, 1),
        Err(WorldError::Status(StatusError::NotOnline { .. }))
    ));

    let relaxed = WorldConfig {
        burn_requires_online: false,
        ..WorldConfig::default()
    };
    let mut f = Fixture::online(relaxed, 1_000)?;
    f.mint(5, 2, 10, 4)?;
    f.world.offline(&f.unit, &f.owner)?;
    let proof = f.proof()?;
    f.world
        .chain_item_to_game(&f.player, &f.unit, &f.owner, &proof, 5, 1)?;
    assert_eq!(f.world.storage_unit(&f.unit)?.inventory().quantity_of(5), 3);
    Ok(())
}

#[test]
fn it_decodes_proofs_within_the_configured_limit() -> anyhow::Result<()> {
    let config = WorldConfig {
        max_proof_data_len: 4,
        ..WorldConfig::default()
    };
    let f = Fixture::online(config, 1_000)?;
    let proof = f.proof()?;
    assert_eq!(f.world.decode_proof(&proof.to_bytes()?)?, proof);

    let mut message = proof.message().clone();
    message.data = vec![0; 5];
    let bulky = message.sign(&f.server)?;
    assert!(matches!(
        f.world.decode_proof(&bulky.to_bytes()?),
        Err(WorldError::Location(LocationError::ProofDataTooLarge { len: 5, max: 4 }))
    ));
    Ok(())
}

#[test]
fn it_mirrors_every_mutation_to_the_journal() -> anyhow::Result<()> {
    let mut f = Fixture::online(WorldConfig::default(), 1_000)?;
    f.world.journal_mut().drain().for_each(drop);

    f.mint(5, 2, 10, 4)?;
    let proof = f.proof()?;
    f.world
        .chain_item_to_game(&f.player, &f.unit, &f.owner, &proof, 5, 1)?;

    let json: Vec<_> = f
        .world
        .journal()
        .events()
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;
    let kinds: Vec<_> = json.iter().map(|event| event["type"].clone()).collect();
    assert_eq!(kinds, vec!["ItemMinted", "ItemQuantityChanged"]);
    assert_eq!(json[1]["quantity_before"], 4);
    assert_eq!(json[1]["quantity_after"], 3);
    assert_eq!(json[1]["used_after"], 30);
    Ok(())
}
