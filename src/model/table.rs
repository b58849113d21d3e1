use super::gaussian::Gaussian;
use std::collections::HashMap;
use std::hash::Hash;

/// Gaussian models keyed by `K`. Missing keys read as [`Gaussian::EMPTY`].
#[derive(Debug, Clone)]
pub struct ModelTable<K> {
    entries: HashMap<K, Gaussian>,
}

impl<K: Eq + Hash + Copy> ModelTable<K> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Fits one model per key from grouped observations.
    pub fn from_groups(groups: HashMap<K, Vec<f64>>) -> Self {
        let entries = groups
            .into_iter()
            .filter_map(|(key, times)| Gaussian::fit(&times).map(|g| (key, g)))
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, key: K, model: Gaussian) {
        self.entries.insert(key, model);
    }

    pub fn get(&self, key: K) -> Gaussian {
        self.entries.get(&key).copied().unwrap_or(Gaussian::EMPTY)
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn mean(&self, key: K) -> f64 {
        self.get(key).mean
    }

    pub fn stdev(&self, key: K) -> f64 {
        self.get(key).stdev
    }

    pub fn variance(&self, key: K) -> f64 {
        self.get(key).variance()
    }

    pub fn worst_case(&self, key: K) -> f64 {
        self.get(key).worst_case()
    }

    pub fn probability(&self, key: K, deadline: f64) -> f64 {
        self.get(key).probability(deadline)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash + Copy> Default for ModelTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Copy> FromIterator<(K, Gaussian)> for ModelTable<K> {
    fn from_iter<I: IntoIterator<Item = (K, Gaussian)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
