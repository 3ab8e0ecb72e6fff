//! Push-channel message parsing and types

mod parser;

pub use parser::{ChannelRequest, PushMessage, parse_push_message};
