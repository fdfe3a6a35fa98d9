//! Insertion-ordered, name-indexed storage for graph elements.

use std::collections::HashMap;

/// Elements of one kind, unique by name, kept in insertion order.
#[derive(Debug)]
pub(crate) struct Registry<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&T> {
        self.position(name).map(|i| &self.items[i])
    }

    /// Position of `name`, inserting `make(position)` if it is new.
    pub(crate) fn ensure(&mut self, name: &str, make: impl FnOnce(usize) -> T) -> usize {
        if let Some(position) = self.position(name) {
            return position;
        }
        let position = self.items.len();
        self.items.push(make(position));
        self.index.insert(name.to_string(), position);
        position
    }

    pub(crate) fn get_at(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    pub(crate) fn at(&self, position: usize) -> &T {
        &self.items[position]
    }

    pub(crate) fn at_mut(&mut self, position: usize) -> &mut T {
        &mut self.items[position]
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
