//! Profile Entity
//!
//! The identity record returned by a role's profile endpoint. Its shape
//! belongs to the remote API; the session layer only requires a non-empty
//! JSON object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::value_object::role::Role;

/// Profile entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Profile(Map<String, Value>);

impl Profile {
    /// Accept a response body as a profile
    ///
    /// Returns `None` unless the body is a non-empty object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) if !map.is_empty() => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Map<String, Value>> for Profile {
    type Error = &'static str;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        if map.is_empty() {
            Err("profile must be a non-empty object")
        } else {
            Ok(Self(map))
        }
    }
}

impl From<Profile> for Map<String, Value> {
    fn from(profile: Profile) -> Self {
        profile.0
    }
}

/// Role and profile of an authenticated visitor
///
/// These always change together.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    role: Role,
    profile: Profile,
}

impl Identity {
    /// Pair a role with its profile; `Anonymous` has no identity
    pub fn new(role: Role, profile: Profile) -> Option<Self> {
        role.is_authenticated().then_some(Self { role, profile })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}
