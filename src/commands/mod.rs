//! Command surface.
//!
//! A single base command with sub-commands selected by alias:
//! - [`CommandEntry`]: aliases, permission, player-only flag, cooldown, handler
//! - [`CommandDispatcher`]: sorted registration, gated dispatch, tab completion
//! - [`Messages`]: the replies each gate sends
//!
//! Every invocation answers with a boolean and a chat message; nothing here
//! ever ends the process.

mod command;
mod dispatcher;
mod messages;

pub use command::{CommandEntry, CommandHandler, CommandId, CommandSender, FnHandler, ROOT_PERMISSION};
pub use dispatcher::{CommandDispatcher, CommandResult};
pub use messages::{color, format_duration, render, Messages};
