pub mod codec;
pub mod resolver;
pub mod transport;

pub use codec::{DecodedReply, MessageBuilder, ReplyParser, ReplyResult};
pub use resolver::{ResolutionEngine, TransactionIds};
pub use transport::{DnsSocketHandle, DnsTransport, ReceiveOutcome, UdpDatagramProvider};
