use std::{cell::RefCell, collections::HashMap, hash::Hash, path::PathBuf};

use cairo::ImageSurface;
use tunglyph_data::state::TunnelState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SizeAndState {
    pub size: i32,
    pub state: TunnelState,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SizeAndLibraryIndex {
    pub size: i32,
    pub index: i32,
    pub library: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SizeAndPath {
    pub size: i32,
    pub path: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SizeAndResource {
    pub size: i32,
    pub id: u32,
}

/// A memo table that only ever grows.
///
/// Entries are written once and never replaced, so a key always maps to the first value that was
/// computed for it. Failed computations leave no trace.
#[derive(Debug)]
pub struct Table<K, V> {
    entries: RefCell<HashMap<K, V>>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    /// Stores `value` unless `key` already has one, returns whichever ended up in the table.
    pub fn insert(&self, key: K, value: V) -> V {
        self.entries
            .borrow_mut()
            .entry(key)
            .or_insert(value)
            .clone()
    }

    /// The borrow on the table is released while `compute` runs, so `compute` may freely look
    /// things up in (or insert into) this very table.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = compute()?;
        Ok(self.insert(key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Every derived visual the application has produced so far, for the lifetime of the process.
///
/// The overlay and status tables share a key shape but hold different things: a composited logo
/// and the bare status glyph respectively.
#[derive(Debug, Default)]
pub struct VisualCache {
    pub overlay: Table<SizeAndState, ImageSurface>,
    pub status: Table<SizeAndState, ImageSurface>,
    pub system: Table<SizeAndLibraryIndex, ImageSurface>,
    pub files: Table<SizeAndPath, ImageSurface>,
    pub embedded: Table<SizeAndResource, ImageSurface>,
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::Table;

    #[test]
    fn computes_once() {
        let table = Table::<i32, String>::default();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>("uwu".to_owned())
        };

        assert_eq!(table.get_or_try_insert_with(1, compute), Ok("uwu".into()));
        assert_eq!(table.get_or_try_insert_with(1, compute), Ok("uwu".into()));
        assert_eq!(calls.get(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn failures_are_not_stored() {
        let table = Table::<i32, &str>::default();

        assert_eq!(table.get_or_try_insert_with(1, || Err("nope")), Err("nope"));
        assert_eq!(table.get(&1), None);

        assert_eq!(table.get_or_try_insert_with(1, || Ok::<_, &str>("yes")), Ok("yes"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn first_write_wins() {
        let table = Table::<i32, &str>::default();

        assert_eq!(table.insert(3, "first"), "first");
        assert_eq!(table.insert(3, "second"), "first");
        assert_eq!(table.get(&3), Some("first"));
    }

    #[test]
    fn reentrant_compute() {
        let table = Table::<i32, i32>::default();

        let outer = table.get_or_try_insert_with(1, || {
            let inner = table.get_or_try_insert_with(2, || Ok::<_, ()>(20))?;
            Ok::<_, ()>(inner + 1)
        });

        assert_eq!(outer, Ok(21));
        assert_eq!(table.get(&2), Some(20));
    }
}
