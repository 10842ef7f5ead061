//! Typed arrays addressed by opaque ids.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::id::OpaqueId;

/// A contiguous array of `T` that can only be indexed by the id type `I`.
///
/// Backs every per-slot state array (indexed by
/// [`ThreadId`](crate::ThreadId)) and every registry (particles, models).
/// Elements are only ever appended; ids stay valid for the collection's
/// lifetime.
pub struct Collection<I, T> {
    items: Vec<T>,
    _id: PhantomData<fn() -> I>,
}

impl<I: OpaqueId, T> Collection<I, T> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _id: PhantomData,
        }
    }

    /// Create a collection of `len` elements produced by `f`.
    pub fn from_fn(len: usize, mut f: impl FnMut(I) -> T) -> Self {
        (0..len).map(|i| f(I::from_index(i))).collect()
    }

    /// Append an element and return its id.
    pub fn push(&mut self, value: T) -> I {
        let id = I::from_index(self.items.len());
        self.items.push(value);
        id
    }

    /// Element for `id`, or `None` if out of range.
    pub fn get(&self, id: I) -> Option<&T> {
        self.items.get(id.index())
    }

    /// Mutable element for `id`, or `None` if out of range.
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.items.get_mut(id.index())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over every valid id in ascending order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = I> + '_ {
        (0..self.items.len()).map(I::from_index)
    }

    /// Iterate over `(id, element)` pairs in ascending id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (I, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, v)| (I::from_index(i), v))
    }

    /// Backing storage as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Backing storage as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<I: OpaqueId, T> Default for Collection<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T: Clone> Clone for Collection<I, T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            _id: PhantomData,
        }
    }
}

impl<I, T: fmt::Debug> fmt::Debug for Collection<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<I: OpaqueId, T> FromIterator<T> for Collection<I, T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self {
            items: iter.into_iter().collect(),
            _id: PhantomData,
        }
    }
}

impl<I: OpaqueId, T> Index<I> for Collection<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.items[id.index()]
    }
}

impl<I: OpaqueId, T> IndexMut<I> for Collection<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.index()]
    }
}
