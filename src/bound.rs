//! Methods bound to a target object.
//!
//! The delegate only keeps a [`Weak`] to the target, it never keeps it alive.
//! Calls made after the target is gone fail with [`DelegateError::TargetDropped`].

use core::cell::RefCell;

use alloc::rc::Weak;

use crate::{
    entry::{EntryKind, Target},
    signature::Signature,
    DelegateError,
};

/// Method taking `&T`.
pub(crate) struct BoundRef<S: Signature, T: 'static> {
    target: Weak<T>,
    method: S::Method<T>,
}

impl<S: Signature, T: 'static> BoundRef<S, T> {
    pub fn new(target: Weak<T>, method: S::Method<T>) -> Self {
        BoundRef { target, method }
    }
}

impl<S: Signature, T: 'static> Clone for BoundRef<S, T> {
    fn clone(&self) -> Self {
        BoundRef {
            target: self.target.clone(),
            method: self.method,
        }
    }
}

impl<S: Signature, T: 'static> Target<S> for BoundRef<S, T> {
    const KIND: EntryKind = EntryKind::Method;

    fn dispatch(&self, args: S::Args) -> Result<S::Output, DelegateError> {
        let Some(target) = self.target.upgrade() else {
            tracing::debug!("bound method called after its target was dropped");
            return Err(DelegateError::TargetDropped);
        };

        Ok(S::call_method(self.method, &*target, args))
    }

    fn equals(&self, other: &Self) -> Option<bool> {
        Some(self.method == other.method && Weak::ptr_eq(&self.target, &other.target))
    }
}

/// Method taking `&mut T`, the target sits in a `RefCell`.
pub(crate) struct BoundMut<S: Signature, T: 'static> {
    target: Weak<RefCell<T>>,
    method: S::MethodMut<T>,
}

impl<S: Signature, T: 'static> BoundMut<S, T> {
    pub fn new(target: Weak<RefCell<T>>, method: S::MethodMut<T>) -> Self {
        BoundMut { target, method }
    }
}

impl<S: Signature, T: 'static> Clone for BoundMut<S, T> {
    fn clone(&self) -> Self {
        BoundMut {
            target: self.target.clone(),
            method: self.method,
        }
    }
}

impl<S: Signature, T: 'static> Target<S> for BoundMut<S, T> {
    const KIND: EntryKind = EntryKind::MethodMut;

    fn dispatch(&self, args: S::Args) -> Result<S::Output, DelegateError> {
        let Some(cell) = self.target.upgrade() else {
            tracing::debug!("bound method called after its target was dropped");
            return Err(DelegateError::TargetDropped);
        };

        let Ok(mut target) = cell.try_borrow_mut() else {
            tracing::debug!("bound method target is already borrowed");
            return Err(DelegateError::TargetBorrowed);
        };

        Ok(S::call_method_mut(self.method, &mut *target, args))
    }

    fn equals(&self, other: &Self) -> Option<bool> {
        Some(self.method == other.method && Weak::ptr_eq(&self.target, &other.target))
    }
}
