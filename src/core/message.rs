use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Counselor,
    AppInfo,
    AppError,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Counselor => "counselor",
            Role::AppInfo => "app/info",
            Role::AppError => "app/error",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_counselor(self) -> bool {
        self == Role::Counselor
    }

    /// App-authored roles render in the transcript but are never part of
    /// the conversation sent to the backend.
    pub fn is_app(self) -> bool {
        matches!(self, Role::AppInfo | Role::AppError)
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "counselor" => Ok(Role::Counselor),
            "app/info" => Ok(Role::AppInfo),
            "app/error" => Ok(Role::AppError),
            _ => Err(format!("invalid transcript role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Position in the transcript, assigned on append and never changed.
    pub order: usize,
}

/// Append-only ordered log of one session's messages.
///
/// Entries are never mutated or removed after insertion; order is
/// strictly insertion order.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) -> &Message {
        let order = self.entries.len();
        self.entries.push(Message {
            role,
            content: content.into(),
            order,
        });
        &self.entries[order]
    }

    pub fn messages(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
