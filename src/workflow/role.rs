use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role held by a user of the garage system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Role {
    Admin,
    GeneralManager,
    /// Mechanics workshop.
    Workshop,
    /// Body shop.
    Bodyshop,
    /// Head of mechanics.
    Cmm,
    /// Head of body shop.
    Cbm,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::GeneralManager => "GENERAL_MANAGER",
            Role::Workshop => "WORKSHOP",
            Role::Bodyshop => "BODYSHOP",
            Role::Cmm => "CMM",
            Role::Cbm => "CBM",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "GENERAL_MANAGER" | "GM" => Ok(Role::GeneralManager),
            "WORKSHOP" => Ok(Role::Workshop),
            "BODYSHOP" => Ok(Role::Bodyshop),
            "CMM" => Ok(Role::Cmm),
            "CBM" => Ok(Role::Cbm),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
