mod dns;
mod stack;

pub use dns::DnsServices;
pub use stack::StackServices;
