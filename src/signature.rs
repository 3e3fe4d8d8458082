mod sealed {
    pub trait Sealed {}
}

/// Call signature of a [`Delegate`](crate::Delegate), spelled as a function pointer type.
///
/// Implemented for `fn(A1, ..., An) -> R` with up to eight arguments.
/// Every argument must be `Clone`, since each entry of a delegate receives its own copy.
///
/// # Example
///
/// ```
/// # use tdelegate::Delegate;
/// let mut d: Delegate<fn(u32, u32) -> u32> = Delegate::new();
/// d.add(|a: u32, b: u32| a + b);
///
/// assert_eq!(d.invoke(2, 3), Ok(5));
/// ```
pub trait Signature: Copy + PartialEq + 'static + sealed::Sealed {
    /// Arguments packed into a tuple.
    type Args: Clone;

    /// Returned value.
    type Output: 'static;

    /// Method taking the target by shared reference, `fn(&T, A1, ..., An) -> R`.
    type Method<T: 'static>: Copy + PartialEq + 'static;

    /// Method taking the target by exclusive reference, `fn(&mut T, A1, ..., An) -> R`.
    type MethodMut<T: 'static>: Copy + PartialEq + 'static;

    /// Calls `method` on `target`.
    fn call_method<T: 'static>(
        method: Self::Method<T>,
        target: &T,
        args: Self::Args,
    ) -> Self::Output;

    /// Calls `method` on `target`.
    fn call_method_mut<T: 'static>(
        method: Self::MethodMut<T>,
        target: &mut T,
        args: Self::Args,
    ) -> Self::Output;
}

/// Anything that can be called with the arguments of `S`.
///
/// Blanket-implemented for every `Fn` with a matching signature,
/// including closures, function items and function pointers.
/// Types of this crate's users can implement it directly, e.g. to carry state
/// that is compared with `PartialEq` by [`Delegate::add_eq`](crate::Delegate::add_eq).
pub trait Callable<S: Signature> {
    fn invoke(&self, args: S::Args) -> S::Output;
}

macro_rules! impl_signature {
    ($($arg:ident),*) => {
        impl<R: 'static, $($arg: Clone + 'static,)*> sealed::Sealed for fn($($arg),*) -> R {}

        impl<R: 'static, $($arg: Clone + 'static,)*> Signature for fn($($arg),*) -> R {
            type Args = ($($arg,)*);
            type Output = R;
            type Method<T: 'static> = fn(&T, $($arg),*) -> R;
            type MethodMut<T: 'static> = fn(&mut T, $($arg),*) -> R;

            #[inline]
            #[allow(non_snake_case)]
            fn call_method<T: 'static>(
                method: Self::Method<T>,
                target: &T,
                ($($arg,)*): Self::Args,
            ) -> R {
                method(target, $($arg),*)
            }

            #[inline]
            #[allow(non_snake_case)]
            fn call_method_mut<T: 'static>(
                method: Self::MethodMut<T>,
                target: &mut T,
                ($($arg,)*): Self::Args,
            ) -> R {
                method(target, $($arg),*)
            }
        }

        impl<F, R: 'static, $($arg: Clone + 'static,)*> Callable<fn($($arg),*) -> R> for F
        where
            F: Fn($($arg),*) -> R,
        {
            #[inline]
            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> R {
                self($($arg),*)
            }
        }
    };
}

/// Expands `$m!(..)` once per supported argument list.
macro_rules! for_each_arity {
    ($m:ident) => {
        $m!();
        $m!(A1);
        $m!(A1, A2);
        $m!(A1, A2, A3);
        $m!(A1, A2, A3, A4);
        $m!(A1, A2, A3, A4, A5);
        $m!(A1, A2, A3, A4, A5, A6);
        $m!(A1, A2, A3, A4, A5, A6, A7);
        $m!(A1, A2, A3, A4, A5, A6, A7, A8);
    };
}

pub(crate) use for_each_arity;

for_each_arity!(impl_signature);
