//! Hash collection aliases.
//!
//! Findings are keyed by short strings (file paths, model ids, callee names),
//! where FxHash beats SipHash comfortably.

pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type FxHashSet<T> = rustc_hash::FxHashSet<T>;
