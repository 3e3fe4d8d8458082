use thiserror::Error;

/// Reasons a [`Delegate`](crate::Delegate) invocation can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum DelegateError {
    /// The delegate (or a nested one) has no entries to call.
    #[error("delegate is empty")]
    Empty,

    /// A bound method's target was dropped before the call.
    #[error("bound method target was dropped")]
    TargetDropped,

    /// A mutable bound method's target is already borrowed, usually by a re-entrant call.
    #[error("bound method target is already borrowed")]
    TargetBorrowed,
}
