use std::{collections::BTreeMap, fmt, sync::Arc};

/// Immutable point-in-time copy of the configuration variables.
///
/// Cloning is cheap: every clone shares the same underlying map, which is
/// never mutated after construction. Readers holding a snapshot keep seeing
/// exactly the values that were installed, even after the store moves on.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    vars: Arc<BTreeMap<String, String>>,
}

impl ConfigSnapshot {
    /// Creates a snapshot that takes ownership of the given mapping.
    pub fn new(vars: BTreeMap<String, String>) -> Self {
        Self {
            vars: Arc::new(vars),
        }
    }

    /// Looks up a single variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns true if the variable is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Number of variables in the snapshot.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if the snapshot holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Read-only view of the underlying mapping.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Returns true if both snapshots share the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.vars, &other.vars)
    }
}

impl fmt::Debug for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.vars.iter()).finish()
    }
}

impl From<BTreeMap<String, String>> for ConfigSnapshot {
    fn from(vars: BTreeMap<String, String>) -> Self {
        Self::new(vars)
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
