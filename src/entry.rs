use core::{
    any::{Any, TypeId},
    fmt,
    marker::PhantomData,
    mem::size_of,
    ptr,
    sync::atomic::{AtomicUsize, Ordering},
};

use alloc::boxed::Box;

use crate::{
    signature::{Callable, Signature},
    storage::InlineStorage,
    DelegateError,
};

/// What an [`Entry`] was created from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Closure, function item or function pointer, stored by value.
    Value,
    /// Method bound to a shared target, see [`Delegate::add_method`](crate::Delegate::add_method).
    Method,
    /// Method bound to a mutable target, see [`Delegate::add_method_mut`](crate::Delegate::add_method_mut).
    MethodMut,
    /// Another delegate, see [`Delegate::add_delegate`](crate::Delegate::add_delegate).
    Nested,
}

/// Concrete value an entry can hold.
pub(crate) trait Target<S: Signature>: Clone + 'static {
    const KIND: EntryKind;

    fn dispatch(&self, args: S::Args) -> Result<S::Output, DelegateError>;

    /// Structural comparison. `None` if values of this type can only be told apart by identity.
    fn equals(&self, other: &Self) -> Option<bool>;
}

/// Value callable without an equality capability.
#[derive(Clone)]
pub(crate) struct Opaque<F>(pub F);

impl<S, F> Target<S> for Opaque<F>
where
    S: Signature,
    F: Callable<S> + Clone + 'static,
{
    const KIND: EntryKind = EntryKind::Value;

    #[inline]
    fn dispatch(&self, args: S::Args) -> Result<S::Output, DelegateError> {
        Ok(self.0.invoke(args))
    }

    #[inline]
    fn equals(&self, other: &Self) -> Option<bool> {
        // Function pointers of the delegate's own signature compare by address.
        let lhs = (&self.0 as &dyn Any).downcast_ref::<S>();
        let rhs = (&other.0 as &dyn Any).downcast_ref::<S>();
        if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
            return Some(lhs == rhs);
        }

        // Zero-sized values have no state, so all of them are the same value.
        (size_of::<F>() == 0).then_some(true)
    }
}

/// Value callable compared with `PartialEq`.
#[derive(Clone)]
pub(crate) struct Comparable<F>(pub F);

impl<S, F> Target<S> for Comparable<F>
where
    S: Signature,
    F: Callable<S> + Clone + PartialEq + 'static,
{
    const KIND: EntryKind = EntryKind::Value;

    #[inline]
    fn dispatch(&self, args: S::Args) -> Result<S::Output, DelegateError> {
        Ok(self.0.invoke(args))
    }

    #[inline]
    fn equals(&self, other: &Self) -> Option<bool> {
        Some(self.0 == other.0)
    }
}

/// Where the target lives relative to the storage.
trait Placement: 'static {
    const INLINE: bool;

    fn store<T>(value: T) -> InlineStorage;

    /// # Safety
    ///
    /// Storage must hold a `T` placed by `Self::store`.
    unsafe fn get<T>(storage: &InlineStorage) -> &T;

    /// # Safety
    ///
    /// Storage must hold a `T` placed by `Self::store`. It must not be used afterwards.
    unsafe fn drop<T>(storage: &mut InlineStorage);
}

/// Target is written into the storage directly.
struct Inlined;

impl Placement for Inlined {
    const INLINE: bool = true;

    fn store<T>(value: T) -> InlineStorage {
        InlineStorage::with(value)
    }

    unsafe fn get<T>(storage: &InlineStorage) -> &T {
        // Safety: It was initialized as `T`.
        unsafe { storage.slot::<T>().assume_init_ref() }
    }

    unsafe fn drop<T>(storage: &mut InlineStorage) {
        // Safety: It was initialized as `T`.
        unsafe { storage.slot_mut::<T>().assume_init_drop() }
    }
}

/// Target is too large, the storage holds a `Box<T>`.
struct Boxed;

impl Placement for Boxed {
    const INLINE: bool = false;

    fn store<T>(value: T) -> InlineStorage {
        InlineStorage::with(Box::new(value))
    }

    unsafe fn get<T>(storage: &InlineStorage) -> &T {
        // Safety: It was initialized as `Box<T>`.
        unsafe { &**storage.slot::<Box<T>>().assume_init_ref() }
    }

    unsafe fn drop<T>(storage: &mut InlineStorage) {
        // Safety: It was initialized as `Box<T>`.
        unsafe { storage.slot_mut::<Box<T>>().assume_init_drop() }
    }
}

// Virtual table to operate on the storage.
struct VTable<S: Signature> {
    kind: EntryKind,
    inline: bool,
    type_id: fn() -> TypeId,
    dispatch: unsafe fn(&InlineStorage, S::Args) -> Result<S::Output, DelegateError>,
    clone: unsafe fn(&InlineStorage) -> InlineStorage,
    equals: unsafe fn(&InlineStorage, &InlineStorage) -> Option<bool>,
    drop: unsafe fn(&mut InlineStorage),
}

struct Erased<S, T, P>(PhantomData<fn() -> (S, T, P)>);

impl<S, T, P> Erased<S, T, P>
where
    S: Signature,
    T: Target<S>,
    P: Placement,
{
    const VTABLE: &'static VTable<S> = &VTable {
        kind: T::KIND,
        inline: P::INLINE,
        type_id: TypeId::of::<T>,
        dispatch: Self::dispatch,
        clone: Self::clone,
        equals: Self::equals,
        drop: P::drop::<T>,
    };

    unsafe fn dispatch(
        storage: &InlineStorage,
        args: S::Args,
    ) -> Result<S::Output, DelegateError> {
        unsafe { P::get::<T>(storage) }.dispatch(args)
    }

    unsafe fn clone(storage: &InlineStorage) -> InlineStorage {
        P::store(unsafe { P::get::<T>(storage) }.clone())
    }

    unsafe fn equals(lhs: &InlineStorage, rhs: &InlineStorage) -> Option<bool> {
        unsafe { P::get::<T>(lhs).equals(P::get::<T>(rhs)) }
    }
}

// Origin ids come from a global counter, so pointer-sized atomic read-modify-write is required.
#[cfg(not(target_has_atomic = "ptr"))]
compile_error!("tdelegate requires a target with pointer-sized atomic operations");

static NEXT_ORIGIN: AtomicUsize = AtomicUsize::new(1);

/// One call target of a [`Delegate`](crate::Delegate).
///
/// Small targets are stored inline, larger ones are boxed.
/// Entries are not `Send` nor `Sync` since bound methods hold `Rc` back-references.
pub struct Entry<S: Signature> {
    vtable: &'static VTable<S>,
    storage: InlineStorage,
    // Shared by clones, identity of targets without structural equality.
    origin: usize,
    unsend: PhantomData<*mut u8>,
}

impl<S: Signature> Entry<S> {
    pub(crate) fn new<T: Target<S>>(target: T) -> Self {
        let (vtable, storage) = if InlineStorage::fits::<T>() {
            (Erased::<S, T, Inlined>::VTABLE, Inlined::store(target))
        } else {
            (Erased::<S, T, Boxed>::VTABLE, Boxed::store(target))
        };

        Entry {
            vtable,
            storage,
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
            unsend: PhantomData,
        }
    }

    /// Returns what this entry was created from.
    ///
    /// # Example
    ///
    /// ```
    /// # use tdelegate::{Delegate, EntryKind};
    /// let mut d: Delegate<fn() -> u8> = Delegate::new();
    /// d.add(|| 1);
    ///
    /// assert_eq!(d.iter().next().unwrap().kind(), EntryKind::Value);
    /// ```
    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.vtable.kind
    }

    /// Returns `true` if the target is stored without a separate allocation.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.vtable.inline
    }

    /// Returns the type id of the stored target wrapper.
    /// Entries with different type ids never compare equal.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        (self.vtable.type_id)()
    }

    /// Calls the target with `args`.
    #[inline]
    pub fn call(&self, args: S::Args) -> Result<S::Output, DelegateError> {
        unsafe { (self.vtable.dispatch)(&self.storage, args) }
    }
}

impl<S: Signature> Clone for Entry<S> {
    fn clone(&self) -> Self {
        Entry {
            vtable: self.vtable,
            storage: unsafe { (self.vtable.clone)(&self.storage) },
            origin: self.origin,
            unsend: PhantomData,
        }
    }
}

impl<S: Signature> Drop for Entry<S> {
    #[inline(always)]
    fn drop(&mut self) {
        unsafe {
            (self.vtable.drop)(&mut self.storage);
        }
    }
}

impl<S: Signature> PartialEq for Entry<S> {
    fn eq(&self, other: &Self) -> bool {
        if ptr::eq(self, other) {
            return true;
        }

        if self.type_id() != other.type_id() {
            return false;
        }

        // Safety: Same type id means both storages hold the same target type, placed the same way.
        unsafe { (self.vtable.equals)(&self.storage, &other.storage) }
            .unwrap_or(self.origin == other.origin)
    }
}

impl<S: Signature> fmt::Debug for Entry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("kind", &self.kind())
            .field("inline", &self.is_inline())
            .finish_non_exhaustive()
    }
}
