#![allow(dead_code)]
use super::mock_datagram::ScriptedReply;
use ferrous_ipstack_domain::DnsServerAddr;
use std::net::{IpAddr, SocketAddr};

pub const RCODE_NOERROR: u8 = 0;
pub const RCODE_FORMERR: u8 = 1;
pub const RCODE_SERVFAIL: u8 = 2;
pub const RCODE_NXDOMAIN: u8 = 3;

pub struct DnsServerBuilder;

impl DnsServerBuilder {
    pub fn test_server() -> DnsServerAddr {
        "192.0.2.53:53".parse().unwrap()
    }

    pub fn test_server_addr() -> SocketAddr {
        Self::test_server().socket_addr()
    }

    pub fn other_host() -> SocketAddr {
        "198.51.100.9:53".parse().unwrap()
    }

    /// The server's address with a different source port.
    pub fn other_port() -> SocketAddr {
        "192.0.2.53:5353".parse().unwrap()
    }
}

/// Hand-built DNS replies to a captured query.
pub struct ReplyBuilder;

impl ReplyBuilder {
    /// Echo the query's identifier and question back with `answers`.
    pub fn answer(query: &[u8], rcode: u8, answers: &[IpAddr]) -> Vec<u8> {
        let mut reply = Vec::with_capacity(512);
        reply.extend_from_slice(&query[0..2]);
        reply.push(0x81);
        reply.push(0x80 | rcode);
        reply.extend_from_slice(&query[4..6]);
        reply.extend_from_slice(&(answers.len() as u16).to_be_bytes());
        reply.extend_from_slice(&[0x00, 0x00]);
        reply.extend_from_slice(&[0x00, 0x00]);
        reply.extend_from_slice(&query[12..]);

        for address in answers {
            reply.extend_from_slice(&[0xc0, 0x0c]);
            match address {
                IpAddr::V4(v4) => {
                    reply.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
                    reply.extend_from_slice(&[0x00, 0x00, 0x00, 0x3c]);
                    reply.extend_from_slice(&[0x00, 0x04]);
                    reply.extend_from_slice(&v4.octets());
                }
                IpAddr::V6(v6) => {
                    reply.extend_from_slice(&[0x00, 0x1c, 0x00, 0x01]);
                    reply.extend_from_slice(&[0x00, 0x00, 0x00, 0x3c]);
                    reply.extend_from_slice(&[0x00, 0x10]);
                    reply.extend_from_slice(&v6.octets());
                }
            }
        }
        reply
    }

    /// Same reply, but carrying a different identifier.
    pub fn with_identifier(mut reply: Vec<u8>, id: u16) -> Vec<u8> {
        reply[0..2].copy_from_slice(&id.to_be_bytes());
        reply
    }

    /// Matching identifier, QR bit clear: not a response at all.
    pub fn not_a_response(query: &[u8]) -> Vec<u8> {
        query.to_vec()
    }

    pub fn from_server(bytes: Vec<u8>) -> ScriptedReply {
        ScriptedReply {
            bytes,
            from: DnsServerBuilder::test_server_addr(),
        }
    }

    pub fn from(bytes: Vec<u8>, from: SocketAddr) -> ScriptedReply {
        ScriptedReply { bytes, from }
    }
}

pub fn query_id(query: &[u8]) -> u16 {
    u16::from_be_bytes([query[0], query[1]])
}
