/// Declares an index newtype together with an append-only arena indexed by it.
///
/// Everything the sweep allocates (segments, vertices, chains, curves) lives
/// in one of these. Nothing is ever removed: the whole arena is dropped when
/// the sweep finishes, so an index stays valid for as long as its arena does.
macro_rules! typed_vec {
    ($(#[$meta:meta])* $vis:vis $vec_name:ident, $idx_name:ident, $dbg_prefix:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
        $vis struct $idx_name(pub usize);

        impl std::fmt::Debug for $idx_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", $dbg_prefix, self.0)
            }
        }

        #[derive(Clone)]
        $vis struct $vec_name<T> {
            inner: Vec<T>,
        }

        #[allow(dead_code)]
        impl<T> $vec_name<T> {
            pub fn with_capacity(cap: usize) -> Self {
                Self {
                    inner: Vec::with_capacity(cap),
                }
            }

            pub fn indices(&self) -> impl Iterator<Item = $idx_name> {
                (0..self.inner.len()).map($idx_name)
            }

            pub fn len(&self) -> usize {
                self.inner.len()
            }

            pub fn is_empty(&self) -> bool {
                self.inner.is_empty()
            }

            /// Adds a new element, returning its index.
            pub fn push(&mut self, elt: T) -> $idx_name {
                self.inner.push(elt);
                $idx_name(self.inner.len() - 1)
            }

            pub fn get(&self, idx: $idx_name) -> Option<&T> {
                self.inner.get(idx.0)
            }

            pub fn iter(&self) -> impl Iterator<Item = ($idx_name, &T)> + '_ {
                self.inner
                    .iter()
                    .enumerate()
                    .map(|(idx, t)| ($idx_name(idx), t))
            }
        }

        impl<T> Default for $vec_name<T> {
            fn default() -> Self {
                Self { inner: Vec::new() }
            }
        }

        impl<T> std::ops::Index<$idx_name> for $vec_name<T> {
            type Output = T;

            fn index(&self, index: $idx_name) -> &Self::Output {
                &self.inner[index.0]
            }
        }

        impl<T> std::ops::IndexMut<$idx_name> for $vec_name<T> {
            fn index_mut(&mut self, index: $idx_name) -> &mut T {
                &mut self.inner[index.0]
            }
        }

        impl<T: std::fmt::Debug> std::fmt::Debug for $vec_name<T> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_map().entries(self.iter()).finish()
            }
        }
    };
}

/// A side table keyed by an arena index, for data that only some of the
/// arena's elements carry.
///
/// The table grows on demand, so it can be keyed by indices that were
/// allocated after the table was created.
#[derive(Clone, Debug)]
pub(crate) struct SideTable<T> {
    inner: Vec<Option<T>>,
}

impl<T> Default for SideTable<T> {
    fn default() -> Self {
        Self { inner: Vec::new() }
    }
}

impl<T> SideTable<T> {
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.inner.get(idx).and_then(Option::as_ref)
    }

    pub fn insert(&mut self, idx: usize, value: T) -> Option<T> {
        if idx >= self.inner.len() {
            self.inner.resize_with(idx + 1, || None);
        }
        self.inner[idx].replace(value)
    }

    pub fn remove(&mut self, idx: usize) -> Option<T> {
        self.inner.get_mut(idx).and_then(Option::take)
    }
}

#[cfg(test)]
mod tests {
    use super::SideTable;

    typed_vec!(ThingVec, ThingIdx, "t");

    #[test]
    fn indices_follow_pushes() {
        let mut things = ThingVec::default();
        let a = things.push("a");
        let b = things.push("b");
        assert_eq!(a, ThingIdx(0));
        assert_eq!(b, ThingIdx(1));
        assert_eq!(things[b], "b");
        assert_eq!(format!("{b:?}"), "t_1");
        assert_eq!(things.indices().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn side_table_grows() {
        let mut table = SideTable::default();
        assert_eq!(table.get(7), None);
        assert_eq!(table.insert(7, 'x'), None);
        assert_eq!(table.insert(7, 'y'), Some('x'));
        assert_eq!(table.get(7), Some(&'y'));
        assert_eq!(table.remove(7), Some('y'));
        assert_eq!(table.get(3), None);
    }
}
