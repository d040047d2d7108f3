use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::info;

use surety_common::{Address, Result, SuretyError};

use super::assigner::{IndexAssigner, OracleIndexes};

/// A registered oracle. Its indexes never change after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Oracle {
    pub identity: Address,
    pub indexes: OracleIndexes,
}

impl Oracle {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Known oracles and the indexes assigned to each.
#[derive(Debug, Clone)]
pub struct OracleRegistry {
    oracles: HashMap<Address, Oracle>,
    assigner: IndexAssigner,
}

impl OracleRegistry {
    pub fn new(assigner: IndexAssigner) -> Self {
        Self {
            oracles: HashMap::new(),
            assigner,
        }
    }

    /// Registers `identity` and draws its index set.
    pub fn register(&mut self, identity: Address) -> Result<OracleIndexes> {
        if self.oracles.contains_key(&identity) {
            return Err(SuretyError::AlreadyRegistered(format!("oracle {identity}")));
        }

        let indexes = self.assigner.assign();
        self.oracles.insert(identity, Oracle { identity, indexes });
        info!("🔮 Oracle {} registered with indexes {:?}", identity, indexes);
        Ok(indexes)
    }

    pub fn indexes_of(&self, identity: &Address) -> Result<OracleIndexes> {
        self.oracles
            .get(identity)
            .map(|o| o.indexes)
            .ok_or_else(|| SuretyError::NotRegistered(format!("oracle {identity}")))
    }

    /// Oracles eligible to answer requests routed under `index`.
    pub fn holders(&self, index: u8) -> BTreeSet<Address> {
        self.oracles
            .values()
            .filter(|o| o.holds(index))
            .map(|o| o.identity)
            .collect()
    }

    pub fn is_registered(&self, identity: &Address) -> bool {
        self.oracles.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    pub fn index_space(&self) -> u8 {
        self.assigner.index_space()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> OracleRegistry {
        OracleRegistry::new(IndexAssigner::new(10, 11).unwrap())
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = registry();
        let oracle = Address::derive("oracle-1");

        let indexes = registry.register(oracle).unwrap();
        assert_eq!(registry.indexes_of(&oracle).unwrap(), indexes);
        assert!(registry.is_registered(&oracle));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_original_indexes() {
        let mut registry = registry();
        let oracle = Address::derive("oracle-1");

        let first = registry.register(oracle).unwrap();
        let err = registry.register(oracle).unwrap_err();
        assert!(matches!(err, SuretyError::AlreadyRegistered(_)));
        assert_eq!(registry.indexes_of(&oracle).unwrap(), first);
    }

    #[test]
    fn test_unknown_oracle() {
        let registry = registry();
        let err = registry.indexes_of(&Address::derive("ghost")).unwrap_err();
        assert!(matches!(err, SuretyError::NotRegistered(_)));
    }

    #[test]
    fn test_holders_match_assignments() {
        let mut registry = registry();
        let mut assigned = Vec::new();
        for i in 0..30 {
            let id = Address::derive(&format!("oracle-{i}"));
            assigned.push((id, registry.register(id).unwrap()));
        }

        for index in 0..10u8 {
            let expected: BTreeSet<Address> = assigned
                .iter()
                .filter(|(_, idx)| idx.contains(&index))
                .map(|(id, _)| *id)
                .collect();
            assert_eq!(registry.holders(index), expected);
        }
    }
}
