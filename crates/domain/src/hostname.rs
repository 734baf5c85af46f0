use crate::errors::DomainError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Longest name that fits the wire format (length octets and root label included).
pub const MAX_NAME_LENGTH: usize = 255;

/// Longest single label.
pub const MAX_LABEL_LENGTH: usize = 63;

/// A hostname that is known to be encodable into a DNS question.
///
/// Validation happens once at construction; nothing downstream truncates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hostname(Arc<str>);

impl Hostname {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let name = input.strip_suffix('.').unwrap_or(input);

        if name.is_empty() {
            return Err(DomainError::InvalidHostname("hostname is empty".to_string()));
        }

        if let Some(c) = name
            .chars()
            .find(|c| !c.is_ascii() || c.is_ascii_whitespace() || c.is_ascii_control())
        {
            return Err(DomainError::InvalidHostname(format!(
                "'{}' contains invalid character {:?}",
                input, c
            )));
        }

        let mut wire_length = 1;
        for label in name.split('.') {
            if label.is_empty() {
                return Err(DomainError::InvalidHostname(format!(
                    "'{}' contains an empty label",
                    input
                )));
            }
            if label.len() > MAX_LABEL_LENGTH {
                return Err(DomainError::InvalidHostname(format!(
                    "label '{}' exceeds {} bytes",
                    label, MAX_LABEL_LENGTH
                )));
            }
            wire_length += label.len() + 1;
        }

        if wire_length > MAX_NAME_LENGTH {
            return Err(DomainError::InvalidHostname(format!(
                "encoded length {} exceeds {} bytes",
                wire_length, MAX_NAME_LENGTH
            )));
        }

        Ok(Self(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of bytes the name occupies in a question section.
    pub fn wire_length(&self) -> usize {
        self.0.split('.').map(|label| label.len() + 1).sum::<usize>() + 1
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl FromStr for Hostname {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
