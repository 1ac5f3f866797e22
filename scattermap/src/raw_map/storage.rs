//! Slot arrays.
//!
//! Keys and values live in two parallel arrays indexed by slot. A slot is
//! initialized exactly when its control byte is full; these arrays do not
//! track that themselves, the owning table does.

use std::mem::MaybeUninit;

pub(crate) struct Slots<T> {
    slots: Vec<MaybeUninit<T>>,
}

impl<T> Slots<T> {
    pub(crate) const fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, MaybeUninit::uninit);
        Self { slots }
    }

    pub(crate) fn as_slice(&self) -> &[MaybeUninit<T>] {
        &self.slots
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [MaybeUninit<T>] {
        &mut self.slots
    }

    /// # Safety
    ///
    /// Slot `index` must not hold a live value; it would be leaked.
    #[inline]
    pub(crate) unsafe fn write(&mut self, index: usize, value: T) -> &mut T {
        self.slots[index].write(value)
    }

    /// # Safety
    ///
    /// Slot `index` must be initialized.
    #[inline]
    pub(crate) unsafe fn get(&self, index: usize) -> &T {
        self.slots[index].assume_init_ref()
    }

    /// # Safety
    ///
    /// Slot `index` must be initialized.
    #[inline]
    pub(crate) unsafe fn get_mut(&mut self, index: usize) -> &mut T {
        self.slots[index].assume_init_mut()
    }

    /// Moves the value out, leaving the slot logically uninitialized.
    ///
    /// # Safety
    ///
    /// Slot `index` must be initialized and must not be read again before
    /// the next `write`.
    #[inline]
    pub(crate) unsafe fn take(&mut self, index: usize) -> T {
        self.slots[index].assume_init_read()
    }

    /// # Safety
    ///
    /// Slot `index` must be initialized and must not be read again before
    /// the next `write`.
    #[inline]
    pub(crate) unsafe fn drop_in_place(&mut self, index: usize) {
        self.slots[index].assume_init_drop()
    }
}
