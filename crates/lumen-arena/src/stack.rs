//! [`StackAllocator`]: atomic bump allocation into a fixed arena.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crate::error::ArenaError;

/// A contiguous range of arena cells returned by an allocation.
///
/// Spans are plain indices and stay meaningful only until the next
/// [`StackAllocator::clear`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StackSpan {
    /// Index of the first cell.
    pub start: usize,
    /// Number of cells.
    pub len: usize,
}

impl StackSpan {
    /// An empty span.
    pub const EMPTY: Self = Self { start: 0, len: 0 };

    /// Whether the span covers no cells.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last cell.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Fixed-capacity arena with a lock-free bump cursor.
///
/// Any number of threads may [`allocate`](Self::allocate) concurrently
/// through `&self`; every successful reservation is disjoint from every
/// other. A request that would run past capacity fails without committing
/// any cells and leaves the arena exhausted: [`size`](Self::size) reports
/// the capacity and all further non-empty requests fail until
/// [`clear`](Self::clear).
pub struct StackAllocator<T> {
    cells: Box<[OnceLock<T>]>,
    cursor: AtomicUsize,
}

impl<T> StackAllocator<T> {
    /// Create an arena holding at most `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: (0..capacity).map(|_| OnceLock::new()).collect(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Reserve `n` contiguous cells.
    ///
    /// `allocate(0)` returns an empty reservation without moving the
    /// cursor, even when the arena is exhausted.
    pub fn allocate(&self, n: usize) -> Result<Reservation<'_, T>, ArenaError> {
        if n == 0 {
            return Ok(Reservation {
                cells: &[],
                span: StackSpan::EMPTY,
            });
        }
        // Failed requests still advance the cursor past capacity so that
        // exhaustion is sticky and later requests cannot interleave into
        // cells an earlier failure skipped.
        let start = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                Some(s.saturating_add(n))
            }) {
            Ok(prev) | Err(prev) => prev,
        };
        let capacity = self.cells.len();
        match start.checked_add(n) {
            Some(end) if end <= capacity => Ok(Reservation {
                cells: &self.cells[start..end],
                span: StackSpan { start, len: n },
            }),
            _ => Err(ArenaError::Exhausted {
                requested: n,
                capacity,
            }),
        }
    }

    /// Values written into the cells of `span`, in cell order.
    ///
    /// Reserved cells that were never written are skipped, as are cells
    /// outside the arena.
    pub fn get(&self, span: StackSpan) -> impl Iterator<Item = &T> + '_ {
        let end = span.end().min(self.cells.len());
        let start = span.start.min(end);
        self.cells[start..end].iter().filter_map(OnceLock::get)
    }

    /// Number of cells handed out, saturating at capacity.
    pub fn size(&self) -> usize {
        self.cursor.load(Ordering::Acquire).min(self.cells.len())
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Whether a request has failed since the last clear.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.load(Ordering::Acquire) > self.cells.len()
    }

    /// Drop every stored value and reset the cursor to zero.
    ///
    /// Requires exclusive access, so no reservation can be outstanding.
    /// Clearing an empty arena is a no-op.
    pub fn clear(&mut self) {
        let used = (*self.cursor.get_mut()).min(self.cells.len());
        for cell in &mut self.cells[..used] {
            cell.take();
        }
        *self.cursor.get_mut() = 0;
    }
}

impl<T> std::fmt::Debug for StackAllocator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackAllocator")
            .field("size", &self.size())
            .field("capacity", &self.capacity())
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}

/// Exclusive write access to the cells of one successful allocation.
pub struct Reservation<'a, T> {
    cells: &'a [OnceLock<T>],
    span: StackSpan,
}

impl<T> Reservation<'_, T> {
    /// The arena span this reservation covers.
    pub fn span(&self) -> StackSpan {
        self.span
    }

    /// Number of reserved cells.
    pub fn len(&self) -> usize {
        self.span.len
    }

    /// Whether the reservation is empty.
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Store `value` in cell `index` of the reservation.
    pub fn write(&self, index: usize, value: T) -> Result<(), ArenaError> {
        let cell = self.cells.get(index).ok_or(ArenaError::OutOfSpan {
            index,
            len: self.span.len,
        })?;
        cell.set(value)
            .map_err(|_| ArenaError::AlreadyWritten { index })
    }

    /// Store each value of `values` in successive cells starting at zero.
    pub fn write_all(&self, values: impl IntoIterator<Item = T>) -> Result<(), ArenaError> {
        for (i, v) in values.into_iter().enumerate() {
            self.write(i, v)?;
        }
        Ok(())
    }
}
