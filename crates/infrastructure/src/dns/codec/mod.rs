mod message_builder;
mod reply_parser;

pub use message_builder::{
    is_response, peek_identifier, MessageBuilder, DNS_HEADER_LEN, MAX_UDP_MESSAGE_LEN,
};
pub use reply_parser::{DecodedReply, ReplyParser, ReplyResult};
