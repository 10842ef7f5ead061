//! Fixed-capacity, lock-free bump arena for transient per-step data.
//!
//! The interaction stage of every step emits a variable number of
//! secondaries per track from many parallel workers into one arena whose
//! capacity is fixed for the run:
//!
//! ```text
//! StackAllocator<T>
//! ├── Box<[OnceLock<T>]>   (capacity cells, written at most once per step)
//! └── AtomicUsize cursor    (bump pointer; the only synchronization point)
//! ```
//!
//! Workers call [`StackAllocator::allocate`] through a shared reference and
//! write into the returned [`Reservation`]. Once every producer and consumer
//! for the step is finished, the owner calls [`StackAllocator::clear`]
//! through an exclusive reference, so clearing can never race a writer.
//!
//! Exhaustion is reported as [`ArenaError::Exhausted`], never as a partial
//! reservation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod stack;

pub use error::ArenaError;
pub use stack::{Reservation, StackAllocator, StackSpan};
