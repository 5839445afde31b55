use serde::Serialize;

use crate::workflow::{ExecutedBy, Recipient, Role};

/// Internal user struct for authentication, including the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub password_hash: String,
}

impl User {
    pub fn executed_by(&self) -> ExecutedBy {
        ExecutedBy {
            id: self.id,
            name: self.full_name.clone(),
            role: self.role,
        }
    }

    pub fn recipient(&self) -> Recipient {
        Recipient {
            id: self.id,
            name: self.full_name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// User as returned by the API, without the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        UserProfile {
            id: u.id,
            username: u.username.clone(),
            full_name: u.full_name.clone(),
            email: u.email.clone(),
            role: u.role,
        }
    }
}

/// New user data for creation.
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}
