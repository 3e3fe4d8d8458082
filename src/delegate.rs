use core::{
    cell::RefCell,
    fmt,
    ops::{AddAssign, SubAssign},
    ptr, slice,
};

use alloc::{rc::Rc, vec::Vec};

use crate::{
    bound::{BoundMut, BoundRef},
    entry::{Comparable, Entry, EntryKind, Opaque, Target},
    signature::{for_each_arity, Callable, Signature},
    DelegateError,
};

/// Sentinel for "no delegate". Compares equal to every empty [`Delegate`].
///
/// # Example
///
/// ```
/// # use tdelegate::{Delegate, Null};
/// let mut d: Delegate<fn()> = Delegate::new();
/// assert!(d == Null);
///
/// d.add(|| {});
/// assert!(d != Null);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Null;

/// Ordered list of call targets invoked together.
///
/// Calling a delegate calls every entry in insertion order with the same arguments
/// and returns the result of the last one. Use [`Delegate::call_all`] to collect all results.
///
/// Cloning a delegate clones every entry. Targets of bound methods are shared, not cloned.
pub struct Delegate<S: Signature> {
    entries: Vec<Entry<S>>,
}

/// Same type as [`Delegate`], under the `Func` name used by C# style delegate APIs.
pub type Func<S> = Delegate<S>;

impl<S: Signature> Delegate<S> {
    /// Construct new empty [`Delegate`].
    #[inline]
    pub const fn new() -> Self {
        Delegate {
            entries: Vec::new(),
        }
    }

    /// Construct new [`Delegate`] holding a single callable, see [`Delegate::add`].
    ///
    /// # Example
    ///
    /// ```
    /// # use tdelegate::Delegate;
    /// let d = Delegate::<fn(i32) -> i32>::with(|x: i32| x + 1);
    ///
    /// assert_eq!(d.invoke(1), Ok(2));
    /// ```
    pub fn with<F>(callable: F) -> Self
    where
        F: Callable<S> + Clone + 'static,
    {
        let mut delegate = Delegate::with_capacity(1);
        delegate.add(callable);
        delegate
    }

    /// Construct new [`Delegate`] holding a single bound method, see [`Delegate::add_method`].
    pub fn with_method<T: 'static>(target: &Rc<T>, method: S::Method<T>) -> Self {
        let mut delegate = Delegate::with_capacity(1);
        delegate.add_method(target, method);
        delegate
    }

    /// Construct new [`Delegate`] holding a single mutable bound method, see [`Delegate::add_method_mut`].
    pub fn with_method_mut<T: 'static>(target: &Rc<RefCell<T>>, method: S::MethodMut<T>) -> Self {
        let mut delegate = Delegate::with_capacity(1);
        delegate.add_method_mut(target, method);
        delegate
    }

    /// Construct new empty [`Delegate`] with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Delegate {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Returns number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there is nothing to call.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns entries in call order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Entry<S>> {
        self.entries.iter()
    }

    /// Appends a closure or function.
    ///
    /// Function pointers of type `S` are compared by value.
    /// Zero-sized callables (function items, closures capturing nothing)
    /// equal any other instance of the same type.
    /// Other closures only equal the entry created here and its clones,
    /// so they cannot be removed with [`Delegate::remove`].
    /// Use [`Delegate::add_eq`] for callables that implement `PartialEq`.
    ///
    /// # Example
    ///
    /// ```
    /// # use tdelegate::Delegate;
    /// fn double(x: i32) -> i32 { x * 2 }
    ///
    /// let mut d: Delegate<fn(i32) -> i32> = Delegate::new();
    /// d.add(double);
    ///
    /// assert_eq!(d.invoke(21), Ok(42));
    /// assert!(d.remove(double));
    /// assert!(d.is_empty());
    /// ```
    pub fn add<F>(&mut self, callable: F)
    where
        F: Callable<S> + Clone + 'static,
    {
        self.push(Entry::new(Opaque(callable)));
    }

    /// Appends a callable that is compared by value.
    pub fn add_eq<F>(&mut self, callable: F)
    where
        F: Callable<S> + Clone + PartialEq + 'static,
    {
        self.push(Entry::new(Comparable(callable)));
    }

    /// Appends a function pointer. `None` is ignored.
    ///
    /// # Example
    ///
    /// ```
    /// # use tdelegate::Delegate;
    /// fn one() -> u8 { 1 }
    ///
    /// let mut d: Delegate<fn() -> u8> = Delegate::new();
    /// d.add_fn(None);
    /// assert!(d.is_empty());
    ///
    /// d.add_fn(Some(one));
    /// assert_eq!(d.invoke(), Ok(1));
    /// ```
    pub fn add_fn(&mut self, function: Option<S>)
    where
        S: Callable<S>,
    {
        match function {
            Some(function) => self.push(Entry::new(Comparable(function))),
            None => tracing::trace!("null function pointer not added"),
        }
    }

    /// Appends `method` bound to `target`.
    ///
    /// Only a weak reference is kept. Calling the delegate after `target`
    /// is dropped fails with [`DelegateError::TargetDropped`].
    ///
    /// # Example
    ///
    /// ```
    /// # use std::rc::Rc;
    /// # use tdelegate::{Delegate, DelegateError};
    /// struct Scale(i32);
    ///
    /// impl Scale {
    ///     fn apply(&self, x: i32) -> i32 { self.0 * x }
    /// }
    ///
    /// let scale = Rc::new(Scale(3));
    /// let mut d: Delegate<fn(i32) -> i32> = Delegate::new();
    /// d.add_method(&scale, Scale::apply);
    /// assert_eq!(d.invoke(2), Ok(6));
    ///
    /// drop(scale);
    /// assert_eq!(d.invoke(2), Err(DelegateError::TargetDropped));
    /// ```
    pub fn add_method<T: 'static>(&mut self, target: &Rc<T>, method: S::Method<T>) {
        self.push(Entry::new(BoundRef::<S, T>::new(Rc::downgrade(target), method)));
    }

    /// Appends `method` bound to a mutable `target`.
    ///
    /// The target is borrowed mutably for the duration of each call.
    /// A call made while it is already borrowed fails with [`DelegateError::TargetBorrowed`].
    pub fn add_method_mut<T: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        method: S::MethodMut<T>,
    ) {
        self.push(Entry::new(BoundMut::<S, T>::new(
            Rc::downgrade(target),
            method,
        )));
    }

    /// Appends another delegate as a single entry.
    ///
    /// The nested delegate is called as a whole and compared as a whole.
    pub fn add_delegate(&mut self, delegate: Delegate<S>) {
        self.push(Entry::new(delegate));
    }

    /// Removes the last entry equal to `callable`, see [`Delegate::add`].
    /// Returns `true` if an entry was removed.
    pub fn remove<F>(&mut self, callable: F) -> bool
    where
        F: Callable<S> + Clone + 'static,
    {
        self.remove_entry(&Entry::new(Opaque(callable)))
    }

    /// Removes the last entry equal to `callable`, see [`Delegate::add_eq`].
    /// Returns `true` if an entry was removed.
    pub fn remove_eq<F>(&mut self, callable: F) -> bool
    where
        F: Callable<S> + Clone + PartialEq + 'static,
    {
        self.remove_entry(&Entry::new(Comparable(callable)))
    }

    /// Removes the last entry equal to `function`. `None` removes nothing.
    /// Returns `true` if an entry was removed.
    pub fn remove_fn(&mut self, function: Option<S>) -> bool
    where
        S: Callable<S>,
    {
        match function {
            Some(function) => self.remove_entry(&Entry::new(Comparable(function))),
            None => false,
        }
    }

    /// Removes the last entry binding `method` to this very `target`.
    /// Returns `true` if an entry was removed.
    pub fn remove_method<T: 'static>(&mut self, target: &Rc<T>, method: S::Method<T>) -> bool {
        self.remove_entry(&Entry::new(BoundRef::<S, T>::new(
            Rc::downgrade(target),
            method,
        )))
    }

    /// Removes the last entry binding `method` to this very mutable `target`.
    /// Returns `true` if an entry was removed.
    pub fn remove_method_mut<T: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        method: S::MethodMut<T>,
    ) -> bool {
        self.remove_entry(&Entry::new(BoundMut::<S, T>::new(
            Rc::downgrade(target),
            method,
        )))
    }

    /// Removes the last nested delegate equal to `delegate`.
    /// Returns `true` if an entry was removed.
    pub fn remove_delegate(&mut self, delegate: &Delegate<S>) -> bool {
        self.remove_entry(&Entry::new(delegate.clone()))
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        tracing::trace!(removed = self.entries.len(), "delegate cleared");
        self.entries.clear();
    }

    /// Calls every entry in order and returns the result of the last one.
    ///
    /// Fails with [`DelegateError::Empty`] if there are no entries.
    /// The first failing entry stops the call, entries after it are not called.
    ///
    /// # Example
    ///
    /// ```
    /// # use tdelegate::{Delegate, DelegateError};
    /// let mut d: Delegate<fn(i32, i32) -> i32> = Delegate::new();
    /// assert_eq!(d.call((1, 2)), Err(DelegateError::Empty));
    ///
    /// d.add(|a: i32, b: i32| a + b);
    /// d.add(|a: i32, b: i32| a * b);
    /// assert_eq!(d.call((3, 4)), Ok(12));
    /// ```
    pub fn call(&self, args: S::Args) -> Result<S::Output, DelegateError> {
        let Some((last, rest)) = self.entries.split_last() else {
            tracing::debug!("empty delegate called");
            return Err(DelegateError::Empty);
        };

        for entry in rest {
            entry.call(args.clone())?;
        }

        last.call(args)
    }

    /// Calls every entry in order and collects all results.
    ///
    /// An empty delegate yields no results.
    /// The first failing entry stops the call and its error is returned.
    pub fn call_all(&self, args: S::Args) -> Result<Vec<S::Output>, DelegateError> {
        let mut results = Vec::with_capacity(self.entries.len());

        if let Some((last, rest)) = self.entries.split_last() {
            for entry in rest {
                results.push(entry.call(args.clone())?);
            }
            results.push(last.call(args)?);
        }

        Ok(results)
    }

    fn push(&mut self, entry: Entry<S>) {
        tracing::trace!(kind = ?entry.kind(), inline = entry.is_inline(), "delegate entry added");
        self.entries.push(entry);
    }

    fn remove_entry(&mut self, needle: &Entry<S>) -> bool {
        match self.entries.iter().rposition(|entry| entry == needle) {
            Some(index) => {
                let entry = self.entries.remove(index);
                tracing::trace!(kind = ?entry.kind(), index, "delegate entry removed");
                true
            }
            None => {
                tracing::trace!(kind = ?needle.kind(), "no matching delegate entry");
                false
            }
        }
    }
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<R: 'static, $($arg: Clone + 'static,)*> Delegate<fn($($arg),*) -> R> {
            /// Same as [`Delegate::call`], with arguments passed one by one.
            #[inline]
            #[allow(non_snake_case, clippy::too_many_arguments)]
            pub fn invoke(&self, $($arg: $arg),*) -> Result<R, DelegateError> {
                self.call(($($arg,)*))
            }

            /// Same as [`Delegate::call_all`], with arguments passed one by one.
            #[inline]
            #[allow(non_snake_case, clippy::too_many_arguments)]
            pub fn invoke_all(&self, $($arg: $arg),*) -> Result<Vec<R>, DelegateError> {
                self.call_all(($($arg,)*))
            }
        }
    };
}

for_each_arity!(impl_invoke);

impl<S: Signature> Target<S> for Delegate<S> {
    const KIND: EntryKind = EntryKind::Nested;

    #[inline]
    fn dispatch(&self, args: S::Args) -> Result<S::Output, DelegateError> {
        self.call(args)
    }

    #[inline]
    fn equals(&self, other: &Self) -> Option<bool> {
        Some(self == other)
    }
}

impl<S: Signature> Default for Delegate<S> {
    #[inline]
    fn default() -> Self {
        Delegate::new()
    }
}

impl<S: Signature> Clone for Delegate<S> {
    fn clone(&self) -> Self {
        Delegate {
            entries: self.entries.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.entries.clone_from(&source.entries);
    }
}

impl<S> From<S> for Delegate<S>
where
    S: Signature + Callable<S>,
{
    /// Construct new [`Delegate`] holding a single function pointer.
    #[inline]
    fn from(function: S) -> Self {
        let mut delegate = Delegate::with_capacity(1);
        delegate.add_fn(Some(function));
        delegate
    }
}

impl<S: Signature> PartialEq for Delegate<S> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other) || self.entries == other.entries
    }
}

impl<S: Signature> PartialEq<Null> for Delegate<S> {
    #[inline]
    fn eq(&self, _: &Null) -> bool {
        self.is_empty()
    }
}

impl<S: Signature> PartialEq<Delegate<S>> for Null {
    #[inline]
    fn eq(&self, delegate: &Delegate<S>) -> bool {
        delegate.is_empty()
    }
}

impl<S, F> AddAssign<F> for Delegate<S>
where
    S: Signature,
    F: Callable<S> + Clone + 'static,
{
    #[inline]
    fn add_assign(&mut self, callable: F) {
        self.add(callable);
    }
}

impl<S, F> SubAssign<F> for Delegate<S>
where
    S: Signature,
    F: Callable<S> + Clone + 'static,
{
    #[inline]
    fn sub_assign(&mut self, callable: F) {
        self.remove(callable);
    }
}

impl<'a, S: Signature> IntoIterator for &'a Delegate<S> {
    type Item = &'a Entry<S>;
    type IntoIter = slice::Iter<'a, Entry<S>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: Signature> fmt::Debug for Delegate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(Entry::kind))
            .finish()
    }
}
