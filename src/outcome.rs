//! # Terminal state of a settled task.
//!
//! [`Outcome`] is the tagged value a task settles into exactly once. It is also
//! the per-slot record returned by [`all_settled`](crate::all_settled) and the
//! payload of [`race`](crate::race).
//!
//! ## Example
//! ```rust
//! use tasksettle::Outcome;
//!
//! let ok: Outcome<u32, String> = Outcome::from(Ok(7));
//! assert!(ok.is_fulfilled());
//! assert_eq!(ok.as_label(), "fulfilled");
//!
//! let err: Outcome<u32, String> = Outcome::Rejected("boom".into());
//! assert_eq!(err.into_result(), Err("boom".to_string()));
//! ```

/// Settlement result of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<V, E> {
    /// Task succeeded with a value.
    Fulfilled(V),
    /// Task failed with an error.
    Rejected(E),
}

impl<V, E> Outcome<V, E> {
    /// Returns `true` for [`Outcome::Fulfilled`].
    #[inline]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Returns `true` for [`Outcome::Rejected`].
    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Fulfilled(_) => "fulfilled",
            Outcome::Rejected(_) => "rejected",
        }
    }

    /// Borrows the payload of either variant.
    pub fn as_ref(&self) -> Outcome<&V, &E> {
        match self {
            Outcome::Fulfilled(v) => Outcome::Fulfilled(v),
            Outcome::Rejected(e) => Outcome::Rejected(e),
        }
    }

    /// Consumes the outcome, returning the value if fulfilled.
    pub fn fulfilled(self) -> Option<V> {
        match self {
            Outcome::Fulfilled(v) => Some(v),
            Outcome::Rejected(_) => None,
        }
    }

    /// Consumes the outcome, returning the error if rejected.
    pub fn rejected(self) -> Option<E> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(e) => Some(e),
        }
    }

    /// Converts into a standard [`Result`].
    pub fn into_result(self) -> Result<V, E> {
        match self {
            Outcome::Fulfilled(v) => Ok(v),
            Outcome::Rejected(e) => Err(e),
        }
    }

    /// Maps the fulfilled value, leaving a rejection untouched.
    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(V) -> U,
    {
        match self {
            Outcome::Fulfilled(v) => Outcome::Fulfilled(f(v)),
            Outcome::Rejected(e) => Outcome::Rejected(e),
        }
    }

    /// Maps the rejection error, leaving a fulfilled value untouched.
    pub fn map_err<E2, F>(self, f: F) -> Outcome<V, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Outcome::Fulfilled(v) => Outcome::Fulfilled(v),
            Outcome::Rejected(e) => Outcome::Rejected(f(e)),
        }
    }
}

impl<V, E> From<Result<V, E>> for Outcome<V, E> {
    fn from(res: Result<V, E>) -> Self {
        match res {
            Ok(v) => Outcome::Fulfilled(v),
            Err(e) => Outcome::Rejected(e),
        }
    }
}

impl<V, E> From<Outcome<V, E>> for Result<V, E> {
    fn from(outcome: Outcome<V, E>) -> Self {
        outcome.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_follow_variant() {
        let ok: Outcome<u8, &str> = Outcome::Fulfilled(1);
        assert!(ok.is_fulfilled());
        assert!(!ok.is_rejected());
        assert_eq!(ok.fulfilled(), Some(1));
        assert_eq!(ok.rejected(), None);

        let err: Outcome<u8, &str> = Outcome::Rejected("nope");
        assert!(err.is_rejected());
        assert_eq!(err.as_label(), "rejected");
        assert_eq!(err.rejected(), Some("nope"));
    }

    #[test]
    fn test_map_only_touches_matching_side() {
        let ok: Outcome<u8, &str> = Outcome::Fulfilled(2);
        assert_eq!(ok.map(|v| v * 10), Outcome::Fulfilled(20));
        assert_eq!(ok.map_err(str::len), Outcome::Fulfilled(2));

        let err: Outcome<u8, &str> = Outcome::Rejected("four");
        assert_eq!(err.map(|v| v * 10), Outcome::Rejected("four"));
        assert_eq!(err.map_err(str::len), Outcome::Rejected(4));
    }

    #[test]
    fn test_result_conversions() {
        let res: Result<u8, String> = Outcome::Rejected("x".to_string()).into();
        assert_eq!(res, Err("x".to_string()));
        assert_eq!(Outcome::<u8, String>::from(Ok(3)).as_ref(), Outcome::Fulfilled(&3));
    }
}
