use std::cell::Cell;

/// Counter that can be bumped through `&self`.
///
/// Used for reads such as `peek` that must not take `&mut self`. The cell is
/// `Send` but not `Sync`; share an engine across threads through a lock.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get().saturating_add(1));
    }
}
