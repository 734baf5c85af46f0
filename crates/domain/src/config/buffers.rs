use serde::{Deserialize, Serialize};

/// Descriptor pool sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    #[serde(default = "default_descriptor_count")]
    pub descriptor_count: usize,

    /// Payload bytes per descriptor, excluding the header offset.
    #[serde(default = "default_payload_capacity")]
    pub payload_capacity: usize,

    /// Receive DNS replies directly into pool descriptors instead of copying.
    #[serde(default = "default_true")]
    pub zero_copy: bool,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            descriptor_count: default_descriptor_count(),
            payload_capacity: default_payload_capacity(),
            zero_copy: default_true(),
        }
    }
}

fn default_descriptor_count() -> usize {
    16
}

fn default_payload_capacity() -> usize {
    1536
}

fn default_true() -> bool {
    true
}
