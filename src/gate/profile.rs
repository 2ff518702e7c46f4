//! User profile returned by the RM identity endpoint. The payload shape varies
//! between RM versions and tenants, so it is kept as an open JSON object and
//! read through lenient accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Profile synthesized from the stored username when nothing is cached.
    #[must_use]
    pub fn fallback(username: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("username".to_string(), Value::from(username));
        fields.insert("name".to_string(), Value::from(username));
        Self(fields)
    }

    /// Accepts only JSON objects; anything else is not a profile.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.first_of(&["id", "ID", "username", "CODUSUARIO"])
    }

    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.first_of(&["name", "fullName", "NOME", "username", "id"])
    }

    #[must_use]
    pub fn email(&self) -> Option<String> {
        self.first_of(&["email", "EMAIL", "mail"])
    }

    // Numbers are accepted too: some tenants return numeric ids.
    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.0.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }
}
