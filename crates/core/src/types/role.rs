//! Message roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of a chat message sender.
///
/// The set is closed: a stored role outside `user`/`assistant` is rejected at
/// the decoding boundary rather than carried through as a loose string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Error returned for a role value outside the closed set.
#[derive(Debug, thiserror::Error)]
#[error("unknown message role: {0}")]
pub struct UnknownRole(String);

impl MessageRole {
    /// The wire/storage form of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MessageRole {
    type Error = UnknownRole;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_form_round_trips() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            assert_eq!(MessageRole::try_from(role.as_str()).expect("known"), role);
        }
    }

    #[test]
    fn rejects_values_outside_the_set() {
        assert!(MessageRole::try_from("system").is_err());
        assert!(MessageRole::try_from("User").is_err());
        assert!(MessageRole::try_from("").is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&MessageRole::Assistant).expect("serialize");
        assert_eq!(json, "\"assistant\"");
    }
}
