//! Sub-command dispatch.
//!
//! Commands are kept sorted by primary alias so registration and lookup
//! use binary search. Dispatch checks, in order, the player-only flag, the
//! permission and the cooldown; the first failing gate answers the sender
//! with its own message and neither runs the handler nor starts the
//! cooldown.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::{Clock, EngineConfig, EntityId};

use super::command::{CommandEntry, CommandId, CommandSender};
use super::messages::{format_duration, render, Messages};

/// Outcome of one command invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// No arguments: the tier GUI was opened.
    OpenedGui,
    /// No arguments: the help listing was sent.
    Help,
    /// The handler ran; `success` is what it returned.
    Executed { success: bool },
    MustBeAPlayer,
    NoPermission,
    OnCooldown(Duration),
    UnknownCommand,
}

impl CommandResult {
    /// The boolean reported back to the host.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::OpenedGui | Self::Help | Self::Executed { .. })
    }
}

type GuiOpener = Box<dyn FnMut(EntityId)>;

/// The base command and its sub-commands.
pub struct CommandDispatcher {
    commands: Vec<CommandEntry>,
    next_id: u32,
    base: String,
    prefix: String,
    tier_gui: bool,
    messages: Messages,
    clock: Arc<dyn Clock>,
    gui: Option<GuiOpener>,
}

impl CommandDispatcher {
    /// Create a dispatcher for `base` (the command name, used in help).
    pub fn new(
        base: impl Into<String>,
        config: &EngineConfig,
        messages: Messages,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            commands: Vec::new(),
            next_id: 0,
            base: base.into(),
            prefix: config.prefix.clone(),
            tier_gui: config.tier_gui,
            messages,
            clock,
            gui: None,
        }
    }

    /// Set what a bare base command opens for players (builder pattern).
    #[must_use]
    pub fn with_gui(mut self, opener: impl FnMut(EntityId) + 'static) -> Self {
        self.gui = Some(Box::new(opener));
        self
    }

    /// Replace prefix, GUI flag and messages after a config reload.
    pub fn reconfigure(&mut self, config: &EngineConfig, messages: Messages) {
        self.prefix = config.prefix.clone();
        self.tier_gui = config.tier_gui;
        self.messages = messages;
    }

    /// Insert a command at its sorted position.
    ///
    /// Disabled commands are not registered and get no id.
    pub fn register(&mut self, mut entry: CommandEntry) -> Option<CommandId> {
        if !entry.enabled {
            debug!(command = entry.primary_alias(), "disabled command not registered");
            return None;
        }
        let id = CommandId(self.next_id);
        self.next_id += 1;
        entry.id = Some(id);

        let index = self
            .commands
            .binary_search_by(|c| c.primary_alias().cmp(entry.primary_alias()))
            .unwrap_or_else(|insert_at| insert_at);
        self.commands.insert(index, entry);
        Some(id)
    }

    /// Remove a command by identity.
    pub fn unregister(&mut self, id: CommandId) -> Option<CommandEntry> {
        let index = self.commands.iter().position(|c| c.id == Some(id))?;
        Some(self.commands.remove(index))
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Registered commands in primary-alias order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandEntry> {
        self.commands.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Index of the command an alias names.
    ///
    /// Primary aliases are found by binary search; other aliases by a scan.
    #[must_use]
    pub fn find(&self, alias: &str) -> Option<usize> {
        self.commands
            .binary_search_by(|c| c.primary_alias().cmp(alias))
            .ok()
            .or_else(|| self.commands.iter().position(|c| c.matches(alias)))
    }

    /// Handle `/<base> <args...>`.
    pub fn on_command(&mut self, sender: &mut dyn CommandSender, args: &[&str]) -> CommandResult {
        let Some(&alias) = args.first() else {
            return self.bare_command(sender);
        };
        let Some(index) = self.find(alias) else {
            self.reply(sender, &self.messages.unknown_command);
            return CommandResult::UnknownCommand;
        };

        let now = self.clock.now();
        let entry = &self.commands[index];

        if entry.only_for_players && !sender.is_player() {
            self.reply(sender, &self.messages.must_be_a_player);
            return CommandResult::MustBeAPlayer;
        }
        if !entry.permits(sender) {
            self.reply(sender, &self.messages.no_permission);
            return CommandResult::NoPermission;
        }
        if let Some(player) = sender.id() {
            let remaining = entry.cooldowns.remaining_time(player, entry.cooldown, now);
            if !remaining.is_zero() {
                let text = format_duration(&self.messages.active_cooldown, remaining);
                self.reply(sender, &text);
                return CommandResult::OnCooldown(remaining);
            }
        }

        let entry = &mut self.commands[index];
        let success = entry.handler.execute(sender, args);
        if success {
            if let Some(player) = sender.id() {
                entry.cooldowns.apply_cooldown(player, now);
            }
        }
        debug!(command = entry.primary_alias(), success, "command executed");
        CommandResult::Executed { success }
    }

    /// Completions for `/<base> <args...>`.
    ///
    /// The first argument completes against aliases ignoring case, so a
    /// stray capital still offers the exact alias to use. Returns an empty
    /// list when nothing matches.
    #[must_use]
    pub fn on_tab_complete(&self, sender: &dyn CommandSender, args: &[&str]) -> Vec<String> {
        match args {
            [] => Vec::new(),
            [partial] => {
                let partial = partial.to_lowercase();
                self.commands
                    .iter()
                    .filter(|c| c.permits(sender))
                    .flat_map(|c| c.aliases.iter())
                    .filter(|alias| alias.to_lowercase().starts_with(&partial))
                    .cloned()
                    .collect()
            }
            [alias, ..] => self
                .find(alias)
                .map(|index| &self.commands[index])
                .filter(|c| c.permits(sender))
                .map_or_else(Vec::new, |c| c.handler.tab_complete(sender, args)),
        }
    }

    /// Send the list of commands the sender may use.
    pub fn help(&self, sender: &mut dyn CommandSender) {
        let lines: Vec<String> = self
            .commands
            .iter()
            .filter(|c| c.permits(&*sender))
            .map(|entry| {
                self.messages
                    .help_entry
                    .replace("%command%", &format!("{} {}", self.base, entry.primary_alias()))
                    .replace("%description%", &entry.description)
            })
            .collect();

        sender.send_message(&render(&self.messages.help_header, &self.prefix));
        for line in lines {
            sender.send_message(&render(&line, &self.prefix));
        }
    }

    fn bare_command(&mut self, sender: &mut dyn CommandSender) -> CommandResult {
        if self.tier_gui {
            if let (Some(player), Some(open)) = (sender.id(), self.gui.as_mut()) {
                open(player);
                return CommandResult::OpenedGui;
            }
        }
        self.help(sender);
        CommandResult::Help
    }

    fn reply(&self, sender: &mut dyn CommandSender, template: &str) {
        sender.send_message(&render(template, &self.prefix));
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("base", &self.base)
            .field("commands", &self.commands)
            .field("tier_gui", &self.tier_gui)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::FnHandler;
    use crate::core::{ManualClock, Timestamp};

    #[derive(Default)]
    struct Sender {
        id: Option<EntityId>,
        permissions: Vec<String>,
        messages: Vec<String>,
    }

    impl CommandSender for Sender {
        fn id(&self) -> Option<EntityId> {
            self.id
        }

        fn has_permission(&self, permission: &str) -> bool {
            self.permissions.iter().any(|p| p == permission)
        }

        fn send_message(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    fn player() -> Sender {
        Sender {
            id: Some(EntityId(1)),
            ..Sender::default()
        }
    }

    fn dispatcher() -> CommandDispatcher {
        let config = EngineConfig {
            tier_gui: false,
            ..EngineConfig::default()
        };
        CommandDispatcher::new(
            "enchants",
            &config,
            Messages::default(),
            Arc::new(ManualClock::new(Timestamp(0))),
        )
    }

    fn entry(alias: &str) -> CommandEntry {
        CommandEntry::new([alias], FnHandler::new(|_, _| true))
    }

    #[test]
    fn test_sorted_insert() {
        let mut d = dispatcher();
        for alias in ["reload", "give", "about", "list"] {
            d.register(entry(alias));
        }
        let order: Vec<&str> = d.commands().map(CommandEntry::primary_alias).collect();
        assert_eq!(order, vec!["about", "give", "list", "reload"]);
        assert_eq!(d.find("list"), Some(2));
    }

    #[test]
    fn test_disabled_not_registered() {
        let mut d = dispatcher();
        assert!(d.register(entry("give").disabled()).is_none());
        assert!(d.is_empty());
    }

    #[test]
    fn test_secondary_alias_found() {
        let mut d = dispatcher();
        d.register(CommandEntry::new(["reload", "rl"], FnHandler::new(|_, _| true)));
        assert_eq!(d.find("rl"), Some(0));
    }

    #[test]
    fn test_bare_command_sends_help() {
        let mut d = dispatcher();
        d.register(entry("give").with_description("Give an enchant"));
        d.register(entry("secret").with_permission("enchants.secret"));

        let mut sender = player();
        assert_eq!(d.on_command(&mut sender, &[]), CommandResult::Help);
        assert_eq!(sender.messages.len(), 2);
        assert!(sender.messages[1].contains("enchants give"));
        assert!(sender.messages[1].contains("Give an enchant"));
    }

    #[test]
    fn test_bare_command_opens_gui_for_players() {
        let opened = std::rc::Rc::new(std::cell::Cell::new(None));
        let seen = opened.clone();
        let mut d = CommandDispatcher::new(
            "enchants",
            &EngineConfig::default(),
            Messages::default(),
            Arc::new(ManualClock::new(Timestamp(0))),
        )
        .with_gui(move |player| seen.set(Some(player)));

        assert_eq!(d.on_command(&mut player(), &[]), CommandResult::OpenedGui);
        assert_eq!(opened.get(), Some(EntityId(1)));

        let mut console = Sender::default();
        assert_eq!(d.on_command(&mut console, &[]), CommandResult::Help);
    }

    #[test]
    fn test_unknown_command_message() {
        let mut d = dispatcher();
        let mut sender = player();
        let result = d.on_command(&mut sender, &["nope"]);
        assert_eq!(result, CommandResult::UnknownCommand);
        assert!(!result.is_success());
        let expected = render(&Messages::default().unknown_command, &EngineConfig::default().prefix);
        assert_eq!(sender.messages, vec![expected]);
    }

    #[test]
    fn test_gate_order() {
        let mut d = dispatcher();
        d.register(entry("give").players_only().with_permission("enchants.give"));

        let mut console = Sender::default();
        assert_eq!(d.on_command(&mut console, &["give"]), CommandResult::MustBeAPlayer);

        let mut sender = player();
        assert_eq!(d.on_command(&mut sender, &["give"]), CommandResult::NoPermission);

        sender.permissions.push("enchants.give".into());
        assert_eq!(
            d.on_command(&mut sender, &["give"]),
            CommandResult::Executed { success: true }
        );
    }

    #[test]
    fn test_tab_complete_top_level() {
        let mut d = dispatcher();
        d.register(entry("give"));
        d.register(entry("gkit"));
        d.register(entry("grant").with_permission("enchants.grant"));

        let completions = d.on_tab_complete(&player(), &["G"]);
        assert_eq!(completions, vec!["give".to_string(), "gkit".to_string()]);
        assert!(d.on_tab_complete(&player(), &["x"]).is_empty());
    }
}
