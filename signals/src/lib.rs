//! # weft-signals
//!
//! Fine-grained reactive primitives for [weft-tui](https://github.com/weft-rs/weft).
//!
//! The runtime is pull-based and version-stamped: every source (signal, slot,
//! derived, reactive collection) carries a monotonic version. Reads performed
//! inside a tracking scope record `(source, version)` pairs; a derived or
//! effect only recomputes when one of its recorded versions has actually
//! advanced. Writes push a cheap "stale" notification through the dependency
//! graph and schedule effects onto a FIFO queue that drains at the flush
//! boundary.
//!
//! Everything is single-threaded and cooperative. Nodes live behind `Rc`,
//! dependents are held weakly, so the graph cannot leak through cycles.
//! Multi-threaded access is undefined without external synchronization.
//!
//! ## Primitives
//!
//! - [`signal`] / [`Signal`] — writable reactive cell
//! - [`derived`] / [`Derived`] — memoized computation, lazily validated
//! - [`effect`] — side-effect closure re-run after dependency writes
//! - [`batch`] / [`flush_sync`] — coalesce writes / drain pending effects
//! - [`effect_scope`] / [`EffectScope`] / [`on_scope_dispose`] — bulk disposal
//! - [`slot`] / [`Slot`] — cell holding a literal, a signal, or a getter
//! - [`TrackedSlotArray`] — reactive sparse array with per-index tracking
//! - [`ReactiveSet`] / [`ReactiveMap`] — collections that invalidate iterators

mod collections;
mod derived;
mod effect;
mod runtime;
mod signal;
mod slot;
mod slot_array;

pub use collections::{ReactiveMap, ReactiveSet};
pub use derived::{derived, derived_eq, Derived};
pub use effect::{effect, effect_scope, on_scope_dispose, EffectScope};
pub use runtime::{batch, flush_sync, untracked};
pub use signal::{signal, Signal};
pub use slot::{slot, Slot};
pub use slot_array::TrackedSlotArray;
