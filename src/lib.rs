//! This crate provides multicast delegates: ordered lists of call targets
//! invoked together, storing small targets inline without heap allocation.
//!
//! `Delegate<fn(A1, ..., An) -> R>` holds closures, function pointers, methods bound to
//! reference-counted objects and other delegates. Calling it calls every entry in
//! insertion order with the same arguments and returns the result of the last one.
//!
//! ## Usage
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//! use tdelegate::{Delegate, DelegateError};
//!
//! struct Counter {
//!     total: i32,
//! }
//!
//! impl Counter {
//!     fn add(&mut self, x: i32) -> i32 {
//!         self.total += x;
//!         self.total
//!     }
//! }
//!
//! let mut on_value: Delegate<fn(i32) -> i32> = Delegate::new();
//!
//! // Calling an empty delegate is an error, not a default value.
//! assert_eq!(on_value.invoke(1), Err(DelegateError::Empty));
//!
//! // Closures are stored by value.
//! on_value.add(|x: i32| x * 10);
//!
//! // Methods are bound to a target that the delegate does not keep alive.
//! let counter = Rc::new(RefCell::new(Counter { total: 0 }));
//! on_value.add_method_mut(&counter, Counter::add);
//!
//! // Every entry runs, the last one's result is returned.
//! assert_eq!(on_value.invoke(5), Ok(5));
//! assert_eq!(on_value.invoke_all(5), Ok(vec![50, 10]));
//!
//! // Entries are removed by value, starting from the most recent one.
//! assert!(on_value.remove_method_mut(&counter, Counter::add));
//! assert_eq!(on_value.len(), 1);
//! ```
//!
//! ## Equality
//!
//! Delegates compare entry by entry, in order. Entries compare by:
//!
//! * value, for callables added with [`Delegate::add_eq`] or [`Delegate::add_fn`],
//!   and for function pointers of the delegate's own signature added with [`Delegate::add`];
//! * type, for zero-sized callables such as function items;
//! * identity, for any other closure: only the entry itself and its clones;
//! * target and method, for bound methods;
//! * full delegate equality, for nested delegates.
//!
//! ## Targets
//!
//! The crate is `no_std` but needs `alloc` and pointer-sized atomic read-modify-write
//! operations (`target_has_atomic = "ptr"`), which rules out targets like `thumbv6m`.

#![no_std]

extern crate alloc;

mod bound;
mod delegate;
mod entry;
mod error;
mod signature;
mod storage;

pub use self::{
    delegate::{Delegate, Func, Null},
    entry::{Entry, EntryKind},
    error::DelegateError,
    signature::{Callable, Signature},
};
