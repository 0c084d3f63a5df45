//! Sub-command definitions.

use std::time::Duration;

use crate::cooldowns::CooldownRegistry;
use crate::core::EntityId;

/// Permission string that every sender holds.
pub const ROOT_PERMISSION: &str = "IridiumEnchants.";

/// Whoever runs a command: a player or the console.
pub trait CommandSender {
    /// The player's entity; `None` for the console.
    fn id(&self) -> Option<EntityId>;

    fn is_player(&self) -> bool {
        self.id().is_some()
    }

    fn has_permission(&self, permission: &str) -> bool;

    fn send_message(&mut self, message: &str);
}

/// The behaviour behind a command.
pub trait CommandHandler {
    /// Run the command. `args[0]` is the alias used. Returning `true`
    /// starts the command's cooldown.
    fn execute(&mut self, sender: &mut dyn CommandSender, args: &[&str]) -> bool;

    /// Completions for the argument being typed (`args.len() >= 2`).
    fn tab_complete(&self, _sender: &dyn CommandSender, _args: &[&str]) -> Vec<String> {
        Vec::new()
    }
}

/// Adapter turning a closure into a [`CommandHandler`].
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
    F: FnMut(&mut dyn CommandSender, &[&str]) -> bool,
{
    pub fn new(handler: F) -> Self {
        Self(handler)
    }
}

impl<F> CommandHandler for FnHandler<F>
where
    F: FnMut(&mut dyn CommandSender, &[&str]) -> bool,
{
    fn execute(&mut self, sender: &mut dyn CommandSender, args: &[&str]) -> bool {
        (self.0)(sender, args)
    }
}

/// Identity of a registered command, used to unregister it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub u32);

/// A sub-command with its gates.
///
/// ```
/// use std::time::Duration;
/// use enchant_engine::commands::{CommandEntry, FnHandler};
///
/// let reload = CommandEntry::new(["reload", "rl"], FnHandler::new(|_, _| true))
///     .with_permission("enchants.reload")
///     .with_cooldown(Duration::from_secs(30))
///     .with_description("Reload the ability catalogue");
///
/// assert_eq!(reload.primary_alias(), "reload");
/// assert!(reload.matches("rl"));
/// assert!(!reload.matches("RL"));
/// ```
pub struct CommandEntry {
    pub(crate) id: Option<CommandId>,
    pub aliases: Vec<String>,
    pub description: String,
    pub permission: String,
    pub only_for_players: bool,
    pub enabled: bool,
    pub cooldown: Duration,
    pub(crate) cooldowns: CooldownRegistry,
    pub(crate) handler: Box<dyn CommandHandler>,
}

impl CommandEntry {
    /// Create an enabled command open to every sender, without cooldown.
    ///
    /// The first alias is the primary one, used for ordering.
    pub fn new<I, S>(aliases: I, handler: impl CommandHandler + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: None,
            aliases: aliases.into_iter().map(Into::into).collect(),
            description: String::new(),
            permission: String::new(),
            only_for_players: false,
            enabled: true,
            cooldown: Duration::ZERO,
            cooldowns: CooldownRegistry::new(),
            handler: Box::new(handler),
        }
    }

    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = permission.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Restrict to player senders (builder pattern).
    #[must_use]
    pub fn players_only(mut self) -> Self {
        self.only_for_players = true;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The id assigned at registration.
    #[must_use]
    pub fn id(&self) -> Option<CommandId> {
        self.id
    }

    #[must_use]
    pub fn primary_alias(&self) -> &str {
        self.aliases.first().map_or("", String::as_str)
    }

    /// Whether `alias` names this command. Case matters: `/enchants GIVE`
    /// is not `/enchants give`.
    #[must_use]
    pub fn matches(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a == alias)
    }

    /// Blank and root permissions let everyone through.
    #[must_use]
    pub fn permits(&self, sender: &dyn CommandSender) -> bool {
        self.permission.is_empty()
            || self.permission.eq_ignore_ascii_case(ROOT_PERMISSION)
            || sender.has_permission(&self.permission)
    }

    #[must_use]
    pub fn cooldowns(&self) -> &CooldownRegistry {
        &self.cooldowns
    }
}

impl std::fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEntry")
            .field("id", &self.id)
            .field("aliases", &self.aliases)
            .field("permission", &self.permission)
            .field("only_for_players", &self.only_for_players)
            .field("enabled", &self.enabled)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}
