//! Candidates currently in an attacker's range, in arrival order.

/// Ordered, duplicate-free set of candidate handles.
///
/// Populated by an external proximity trigger. Entries that die without
/// leaving range are only removed by `remove_invalid`.
#[derive(Debug, Clone)]
pub struct TargetSet<H> {
    entries: Vec<H>,
}

impl<H> Default for TargetSet<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H: Copy + PartialEq> TargetSet<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handle` unless already present. Returns true if added.
    pub fn add(&mut self, handle: H) -> bool {
        if self.contains(handle) {
            return false;
        }
        self.entries.push(handle);
        true
    }

    /// Remove `handle`, keeping the order of the rest. Returns true if found.
    pub fn remove(&mut self, handle: H) -> bool {
        match self.entries.iter().position(|&h| h == handle) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every entry for which `is_invalid` holds, preserving the order
    /// of survivors. Returns the removed handles in their former order.
    pub fn remove_invalid(&mut self, mut is_invalid: impl FnMut(H) -> bool) -> Vec<H> {
        let mut removed = Vec::new();
        self.entries.retain(|&handle| {
            if is_invalid(handle) {
                removed.push(handle);
                false
            } else {
                true
            }
        });
        removed
    }

    /// The entries as of now. Stable for as long as the borrow lives.
    pub fn snapshot(&self) -> &[H] {
        &self.entries
    }

    pub fn contains(&self, handle: H) -> bool {
        self.entries.contains(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = H> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
