use crate::error::{ConfigError, OwnerResolutionError};

use std::collections::BTreeMap;

/// Owner id -> substring expected in the bill's nickname line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerMapping {
    owners: BTreeMap<String, String>,
}

impl OwnerMapping {
    /// Rejects empty display names and pairs where one name contains the
    /// other, since either would make resolution depend on iteration order.
    pub fn new(owners: BTreeMap<String, String>) -> Result<Self, ConfigError> {
        for (owner, name) in &owners {
            if name.is_empty() {
                return Err(ConfigError::EmptyDisplayName {
                    owner: owner.clone(),
                });
            }
        }

        let entries: Vec<_> = owners.iter().collect();
        for (i, (first, first_name)) in entries.iter().enumerate() {
            for (second, second_name) in &entries[i + 1..] {
                if first_name.contains(second_name.as_str())
                    || second_name.contains(first_name.as_str())
                {
                    return Err(ConfigError::OverlappingOwners {
                        first: first.to_string(),
                        first_name: first_name.to_string(),
                        second: second.to_string(),
                        second_name: second_name.to_string(),
                    });
                }
            }
        }

        Ok(Self { owners })
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// First owner, in id order, whose display name occurs in `identity`.
    pub fn resolve(&self, identity: &str) -> Result<&str, OwnerResolutionError> {
        self.owners
            .iter()
            .find(|(_, name)| identity.contains(name.as_str()))
            .map(|(owner, _)| owner.as_str())
            .ok_or_else(|| OwnerResolutionError {
                identity: identity.to_string(),
                mapping: self.owners.clone(),
            })
    }
}
