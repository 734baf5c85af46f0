//! DNS query construction.
//!
//! Builds the single-question, recursion-desired `A` query the resolver sends
//! over UDP, using `hickory-proto` for the wire encoding.

use ferrous_ipstack_domain::{DomainError, Hostname, TransactionId};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Fixed DNS header size (RFC 1035 §4.1.1).
pub const DNS_HEADER_LEN: usize = 12;

/// Maximum DNS message size over UDP without EDNS(0).
pub const MAX_UDP_MESSAGE_LEN: usize = 512;

const QR_FLAG: u8 = 0x80;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Encode a query for the address of `hostname` carrying `identifier`.
    ///
    /// `Hostname` already guarantees the name fits the wire format; an
    /// encoder rejection is still reported as an invalid hostname rather than
    /// sending a truncated name.
    pub fn encode_request(
        hostname: &Hostname,
        identifier: TransactionId,
    ) -> Result<Vec<u8>, DomainError> {
        let name = Name::from_str(hostname.as_str()).map_err(|e| {
            DomainError::InvalidHostname(format!("'{}': {}", hostname, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordType::A);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(identifier.get(), MessageType::Query, OpCode::Query);
        message.metadata.recursion_desired = true;
        message.add_query(query);

        let mut buf = Vec::with_capacity(MAX_UDP_MESSAGE_LEN);
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::EncodeFailed(e.to_string()))?;

        if buf.len() > MAX_UDP_MESSAGE_LEN {
            return Err(DomainError::InvalidHostname(format!(
                "'{}' does not fit a {} byte query",
                hostname, MAX_UDP_MESSAGE_LEN
            )));
        }

        Ok(buf)
    }
}

/// Header-only validity check: the identifier of a message long enough to
/// carry a DNS header, `None` otherwise.
pub fn peek_identifier(bytes: &[u8]) -> Option<TransactionId> {
    if bytes.len() < DNS_HEADER_LEN {
        return None;
    }
    Some(TransactionId(u16::from_be_bytes([bytes[0], bytes[1]])))
}

/// Whether the QR bit marks the message as a response.
pub fn is_response(bytes: &[u8]) -> bool {
    bytes.len() >= DNS_HEADER_LEN && bytes[2] & QR_FLAG != 0
}
