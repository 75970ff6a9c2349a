use std::fmt;

use crate::error::InferenceError;

/// Human-readable label for a predicted class code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLabel {
    Bad,
    Good,
}

impl TargetLabel {
    /// 0 → `bad`, 1 → `good`; anything else is rejected.
    pub fn from_code(code: i64) -> Result<Self, InferenceError> {
        match code {
            0 => Ok(TargetLabel::Bad),
            1 => Ok(TargetLabel::Good),
            other => Err(InferenceError::UnknownLabel(other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetLabel::Bad => "bad",
            TargetLabel::Good => "good",
        }
    }
}

impl fmt::Display for TargetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
