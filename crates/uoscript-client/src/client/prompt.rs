use serde::{Deserialize, Serialize};

use super::types::Serial;

/// A free-text prompt opened by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub serial: Serial,
    pub prompt_id: u32,
}
