//! The engine context.
//!
//! `EnchantEngine` owns every piece of engine state: configuration, the
//! ability catalogue, dispatchers, the mutation tracker and user data. The
//! host creates one at startup, calls it from its main thread for every
//! event, command and scheduled task, and hands it back through
//! [`EnchantEngine::shutdown`] when stopping.
//!
//! ```
//! use std::sync::Arc;
//! use enchant_engine::core::{
//!     EngineConfig, EngineRng, EntityKind, EquipmentSlot, ItemStack, Location, ManualClock,
//!     Timestamp,
//! };
//! use enchant_engine::engine::EnchantEngine;
//! use enchant_engine::sim::SimWorld;
//! use enchant_engine::triggers::GameEvent;
//!
//! let clock = ManualClock::new(Timestamp(0));
//! let mut engine = EnchantEngine::new(EngineConfig::default(), Arc::new(clock), EngineRng::new(1));
//!
//! let mut world = SimWorld::new();
//! let player = world.spawn(EntityKind::Player, Location::new(0.0, 64.0, 0.0));
//! world.equip(player, EquipmentSlot::Boots, ItemStack::new("GOLDEN_BOOTS", 1).with_enchant("Speed", 3));
//!
//! let report = engine.handle_event(&mut world, &GameEvent::Passive { actor: player });
//! assert_eq!(report.fired_count(), 1);
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::abilities::{apply_crystal, AbilityStore, CrystalApply, Purchase, TierShop};
use crate::commands::{CommandDispatcher, CommandResult, CommandSender, Messages};
use crate::core::{Clock, EngineConfig, EngineRng, EntityId, ItemStack, Result, World};
use crate::mutations::MutationTracker;
use crate::support::SupportRegistry;
use crate::tasks::{save_in_background, EngineTask};
use crate::triggers::{DispatchEnv, DispatchReport, GameEvent, TriggerDispatcher};
use crate::users::{SaveSlot, UserStore};

/// Name of the base command.
pub const BASE_COMMAND: &str = "enchants";

const CATALOGUE_FILE: &str = "enchantments.json";
const MESSAGES_FILE: &str = "messages.json";
const USERS_FILE: &str = "users.bin";

/// What handling a scheduled task did.
#[derive(Debug)]
pub enum TaskOutcome {
    /// Mutations reverted by the sweep.
    Swept(usize),
    /// The save is being written on the blocking pool. Resolves to whether
    /// the snapshot reached disk.
    SaveStarted(JoinHandle<Result<bool>>),
    /// No runtime was available, so the save was written in place.
    Saved(Result<bool>),
}

/// Owner of all engine state.
pub struct EnchantEngine {
    config: EngineConfig,
    store: AbilityStore,
    mutations: MutationTracker,
    support: SupportRegistry,
    triggers: TriggerDispatcher,
    commands: CommandDispatcher,
    users: UserStore,
    saves: SaveSlot,
    clock: Arc<dyn Clock>,
}

impl EnchantEngine {
    /// Create an engine with the built-in catalogue and default messages.
    /// Nothing is read from disk.
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>, rng: EngineRng) -> Self {
        let commands = CommandDispatcher::new(BASE_COMMAND, &config, Messages::default(), Arc::clone(&clock));
        Self {
            store: AbilityStore::with_defaults(),
            mutations: MutationTracker::new(),
            support: SupportRegistry::new(),
            triggers: TriggerDispatcher::new(rng),
            commands,
            users: UserStore::new(),
            saves: SaveSlot::new(config.data_dir.join(USERS_FILE)),
            clock,
            config,
        }
    }

    /// Create an engine from the files under `config.data_dir`.
    ///
    /// A missing catalogue is written out with the built-in abilities;
    /// missing messages and user data fall back to defaults.
    pub fn open(config: EngineConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let mut engine = Self::new(config, clock, EngineRng::from_entropy());
        engine.store = AbilityStore::load_or_init(engine.data_path(CATALOGUE_FILE))?;
        let messages = engine.load_messages()?;
        engine.commands.reconfigure(&engine.config, messages);
        engine.users = UserStore::load(engine.data_path(USERS_FILE))?;
        info!(
            abilities = engine.store.len(),
            users = engine.users.len(),
            data_dir = %engine.config.data_dir.display(),
            "enchant engine started"
        );
        Ok(engine)
    }

    #[must_use]
    pub fn with_store(mut self, store: AbilityStore) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub fn with_support(mut self, support: SupportRegistry) -> Self {
        self.support = support;
        self
    }

    /// Set what a bare base command opens for players.
    #[must_use]
    pub fn with_gui(mut self, opener: impl FnMut(EntityId) + 'static) -> Self {
        self.commands = self.commands.with_gui(opener);
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &AbilityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AbilityStore {
        &mut self.store
    }

    #[must_use]
    pub fn mutations(&self) -> &MutationTracker {
        &self.mutations
    }

    pub fn support_mut(&mut self) -> &mut SupportRegistry {
        &mut self.support
    }

    #[must_use]
    pub fn triggers(&self) -> &TriggerDispatcher {
        &self.triggers
    }

    #[must_use]
    pub fn commands(&self) -> &CommandDispatcher {
        &self.commands
    }

    /// Register or unregister sub-commands.
    pub fn commands_mut(&mut self) -> &mut CommandDispatcher {
        &mut self.commands
    }

    #[must_use]
    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// Handle one host event.
    ///
    /// Joins and quits update user data. An enchanting-table event first
    /// rolls a custom enchantment onto the item, so abilities listening to
    /// `ON_ENCHANT_APPLY` see it. Applying a crystal fires nothing; the
    /// payload item is the merged result, or absent when the crystal was
    /// refused. The report's payload holds the event data the host should
    /// apply.
    pub fn handle_event(&mut self, world: &mut dyn World, event: &GameEvent) -> DispatchReport {
        let now = self.clock.now();
        match event {
            GameEvent::PlayerJoin { player, name } => {
                self.users.on_join(*player, name, now);
                return DispatchReport::default();
            }
            GameEvent::PlayerQuit { player } => {
                self.users.on_quit(*player, now);
                return DispatchReport::default();
            }
            GameEvent::ApplyCrystal { crystal, item, .. } => {
                let mut report = DispatchReport::default();
                if let CrystalApply::Applied { item, .. } = self.apply_crystal(crystal, item) {
                    report.payload.item = Some(item);
                }
                return report;
            }
            GameEvent::ItemEnchant { actor, item } => {
                let shop = TierShop::new(&self.store, &self.config);
                if let Some((ability, level)) = shop.roll_enchanting_table(item, self.triggers.rng_mut()) {
                    let event = GameEvent::ItemEnchant {
                        actor: *actor,
                        item: item.clone().with_enchant(ability, level),
                    };
                    return self.dispatch(world, &event);
                }
            }
            _ => {}
        }
        self.dispatch(world, event)
    }

    fn dispatch(&mut self, world: &mut dyn World, event: &GameEvent) -> DispatchReport {
        let mut env = DispatchEnv {
            world,
            store: &self.store,
            mutations: &mut self.mutations,
            support: &self.support,
            config: &self.config,
            now: self.clock.now(),
        };
        self.triggers.dispatch(event, &mut env)
    }

    /// Buy a random ability of `tier` for `buyer`.
    pub fn purchase(&mut self, world: &mut dyn World, buyer: EntityId, tier: &str) -> Purchase {
        let shop = TierShop::new(&self.store, &self.config);
        let purchase = shop.purchase(world, buyer, tier, self.triggers.rng_mut());
        if matches!(purchase, Purchase::Bought { .. }) {
            self.users.record_purchase(buyer);
        }
        purchase
    }

    /// Merge a crystal's enchantment onto `item`, capped at the ability's
    /// highest level.
    #[must_use]
    pub fn apply_crystal(&self, crystal: &ItemStack, item: &ItemStack) -> CrystalApply {
        apply_crystal(&self.store, crystal, item)
    }

    pub fn on_command(&mut self, sender: &mut dyn CommandSender, args: &[&str]) -> CommandResult {
        self.commands.on_command(sender, args)
    }

    #[must_use]
    pub fn on_tab_complete(&self, sender: &dyn CommandSender, args: &[&str]) -> Vec<String> {
        self.commands.on_tab_complete(sender, args)
    }

    /// Run a task sent by the [`TaskScheduler`](crate::tasks::TaskScheduler).
    pub fn handle_task(&mut self, world: &mut dyn World, task: EngineTask) -> TaskOutcome {
        match task {
            EngineTask::SweepMutations => TaskOutcome::Swept(self.mutations.sweep(world, self.clock.now())),
            EngineTask::SaveUsers => {
                let snapshot = self.users.snapshot();
                if tokio::runtime::Handle::try_current().is_ok() {
                    TaskOutcome::SaveStarted(save_in_background(snapshot, self.saves.clone()))
                } else {
                    TaskOutcome::Saved(self.saves.write(&snapshot))
                }
            }
        }
    }

    /// Write user data now, on the calling thread.
    ///
    /// Waits for any background save still writing. Returns `false` when a
    /// newer snapshot is already on disk.
    pub fn save_users(&self) -> Result<bool> {
        self.saves.write(&self.users.snapshot())
    }

    /// Reload the catalogue and messages from the data directory.
    ///
    /// On error nothing changes. Returns the number of abilities loaded.
    pub fn reload(&mut self) -> Result<usize> {
        let messages = self.load_messages()?;
        let count = self.store.reload(self.data_path(CATALOGUE_FILE))?;
        self.commands.reconfigure(&self.config, messages);
        info!(abilities = count, "enchant engine reloaded");
        Ok(count)
    }

    /// Replace the configuration, keeping the current messages.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<()> {
        if config.data_dir != self.config.data_dir {
            self.saves = SaveSlot::new(config.data_dir.join(USERS_FILE));
        }
        self.config = config;
        let messages = self.load_messages()?;
        self.commands.reconfigure(&self.config, messages);
        Ok(())
    }

    /// Stop the engine.
    ///
    /// Every pending block mutation is reverted before this returns, then
    /// user data is saved. Returns how many blocks were restored.
    pub fn shutdown(mut self, world: &mut dyn World) -> Result<usize> {
        let reverted = self.mutations.flush(world);
        if let Err(e) = self.save_users() {
            warn!(error = %e, "user data not saved at shutdown");
            return Err(e);
        }
        info!(reverted, "enchant engine stopped");
        Ok(reverted)
    }

    fn data_path(&self, file: &str) -> PathBuf {
        self.config.data_dir.join(file)
    }

    fn load_messages(&self) -> Result<Messages> {
        let path = self.data_path(MESSAGES_FILE);
        if path.exists() {
            Messages::load(path)
        } else {
            Ok(Messages::default())
        }
    }
}

impl std::fmt::Debug for EnchantEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnchantEngine")
            .field("abilities", &self.store.len())
            .field("pending_mutations", &self.mutations.len())
            .field("users", &self.users.len())
            .field("commands", &self.commands.len())
            .finish_non_exhaustive()
    }
}
