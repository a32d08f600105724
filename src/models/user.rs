use serde::{Deserialize, Serialize};

/// Names offered by the identity selector.
pub const FAMILY_MEMBERS: [&str; 5] = ["Joakim", "Jan", "Eva", "Hanna", "Gustav"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}

impl User {
    /// Builds a user from a roster pick or a typed name.
    /// Surrounding whitespace is dropped; a blank name is rejected.
    pub fn new(name: &str) -> anyhow::Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("user name must not be empty");
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}
