use super::message_builder::{is_response, peek_identifier};
use ferrous_ipstack_domain::{AddressList, TransactionId};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use std::net::IpAddr;
use tracing::debug;

/// Classification of one received datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyResult {
    /// Addresses in answer-section order. Never empty.
    Success(AddressList),
    NoSuchName,
    ServerFailure,
    Malformed,
    /// Well-formed, but for an identifier nobody is waiting on.
    Unsolicited,
}

impl ReplyResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success(_) => "NOERROR",
            Self::NoSuchName => "NXDOMAIN",
            Self::ServerFailure => "SERVFAIL",
            Self::Malformed => "MALFORMED",
            Self::Unsolicited => "UNSOLICITED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReply {
    /// `None` when the datagram is too short to carry a header.
    pub identifier: Option<TransactionId>,
    pub result: ReplyResult,
}

impl DecodedReply {
    /// Match against the identifier of the outstanding request.
    pub fn classify(self, expected: TransactionId) -> ReplyResult {
        match self.identifier {
            None => ReplyResult::Malformed,
            Some(id) if id != expected => ReplyResult::Unsolicited,
            Some(_) => self.result,
        }
    }

    pub fn matches(&self, expected: TransactionId) -> bool {
        self.identifier == Some(expected)
    }
}

pub struct ReplyParser;

impl ReplyParser {
    pub fn decode_reply(bytes: &[u8]) -> DecodedReply {
        let Some(identifier) = peek_identifier(bytes) else {
            debug!(len = bytes.len(), "DNS reply shorter than header");
            return DecodedReply {
                identifier: None,
                result: ReplyResult::Malformed,
            };
        };

        let result = if is_response(bytes) {
            Self::classify_body(bytes)
        } else {
            debug!(id = %identifier, "Datagram is not a DNS response");
            ReplyResult::Malformed
        };

        DecodedReply {
            identifier: Some(identifier),
            result,
        }
    }

    fn classify_body(bytes: &[u8]) -> ReplyResult {
        let message = match Message::from_vec(bytes) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "Failed to parse DNS reply");
                return ReplyResult::Malformed;
            }
        };

        match message.metadata.response_code {
            ResponseCode::NoError => {}
            ResponseCode::NXDomain => return ReplyResult::NoSuchName,
            rcode => {
                debug!(rcode = ?rcode, "DNS server reported failure");
                return ReplyResult::ServerFailure;
            }
        }

        // Only A records answer the A query; CNAME links and stray AAAA
        // records are skipped.
        let mut addresses = AddressList::new();
        for record in &message.answers {
            if let RData::A(a) = &record.data {
                addresses.push(IpAddr::V4(a.0));
            }
        }

        let truncated = message.metadata.truncation;
        debug!(
            answers = message.answers.len(),
            addresses = addresses.len(),
            truncated,
            "DNS reply parsed"
        );

        if !addresses.is_empty() {
            ReplyResult::Success(addresses)
        } else if truncated {
            // The rest of the answer did not fit a UDP datagram.
            ReplyResult::Malformed
        } else {
            ReplyResult::NoSuchName
        }
    }
}
