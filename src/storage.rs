use core::mem::{align_of, size_of, MaybeUninit};

const ENTRY_STORAGE_SIZE: usize = size_of::<[usize; 3]>();
const ENTRY_STORAGE_ALIGN: usize = 8;

/// Fixed buffer an entry keeps its target in.
/// Large enough for a `Vec`, so nested delegates and bound methods are kept inline.
#[repr(C, align(8))] // keep in sync with `ENTRY_STORAGE_ALIGN`
pub(crate) struct InlineStorage {
    bytes: MaybeUninit<[u8; ENTRY_STORAGE_SIZE]>,
}

impl InlineStorage {
    /// Returns `true` if a `T` can live in the buffer itself.
    pub const fn fits<T>() -> bool {
        size_of::<T>() <= ENTRY_STORAGE_SIZE && align_of::<T>() <= ENTRY_STORAGE_ALIGN
    }

    /// Moves `value` into a fresh buffer.
    /// Panics if `T` does not fit, callers box first.
    pub fn with<T>(value: T) -> Self {
        let mut storage = InlineStorage {
            bytes: MaybeUninit::uninit(),
        };
        storage.slot_mut::<T>().write(value);
        storage
    }

    /// Returns the buffer viewed as a possibly uninitialized `T`.
    ///
    /// The caller is responsible to ensure that the type is correct and the value is initialized before reading it.
    pub fn slot<T>(&self) -> &MaybeUninit<T> {
        // Not const: must only fire on the branch that is actually taken.
        assert!(Self::fits::<T>());

        // Safety: size and alignment were checked above.
        unsafe { &*self.bytes.as_ptr().cast() }
    }

    /// Mutable counterpart of [`InlineStorage::slot`].
    pub fn slot_mut<T>(&mut self) -> &mut MaybeUninit<T> {
        assert!(Self::fits::<T>());

        // Safety: size and alignment were checked above.
        unsafe { &mut *self.bytes.as_mut_ptr().cast() }
    }
}
