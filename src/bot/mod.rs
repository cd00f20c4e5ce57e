/// Command dispatch and outcome taxonomy
pub mod dispatcher;
/// Inbound webhook event parsing
pub mod event;
/// Command listing renderer
pub mod help;
/// Outbound message payloads
pub mod message;
/// Command registration table
pub mod registry;
/// Reply delivery to the chat platform
pub mod reply;

pub use dispatcher::{DispatchError, DispatchOutcome, Dispatcher, NoReply};
pub use event::{EventError, InboundEvent, ReplyToken, RequestContext};
pub use message::OutboundMessage;
pub use registry::{Command, CommandHandler, CommandRegistry, RegistryError, HELP_KEYWORD};
pub use reply::{LineReplyClient, ReplyError, ReplySender};
