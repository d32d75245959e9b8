//! Hash containers used while checking a grammar.

use hashlink::LinkedHashMap;
use rustc_hash::FxBuildHasher;

pub use rustc_hash::FxHashMap as HashMap;

/// A map iterating in declaration order.
pub type OrderedMap<K, V> = LinkedHashMap<K, V, FxBuildHasher>;
