//! Absent-extended values.
//!
//! The synchronous and discrete-time MoCs need to express "no event in
//! this evaluation cycle". An [`AbstExt`] is either `Absent` or carries
//! a `Present` value. The payload of an absent token simply does not
//! exist, so it can never be read by accident.
//!
//! # Example
//!
//! ```
//! use forsyde::AbstExt;
//!
//! let a = AbstExt::present(3);
//! let b: AbstExt<i32> = AbstExt::absent();
//!
//! assert_eq!(a.from_abst_ext(0), 3);
//! assert_eq!(b.from_abst_ext(7), 7);
//! assert!(b.is_absent());
//! assert_eq!(format!("{} {}", a, b), "3 _");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value extended with the absent symbol `_`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbstExt<T> {
    /// No value in this cycle.
    Absent,
    /// A present value.
    Present(T),
}

impl<T> Default for AbstExt<T> {
    fn default() -> Self {
        AbstExt::Absent
    }
}

impl<T> AbstExt<T> {
    /// Creates a present token.
    pub fn present(value: T) -> Self {
        AbstExt::Present(value)
    }

    /// Creates an absent token.
    pub fn absent() -> Self {
        AbstExt::Absent
    }

    /// Returns `true` if the token carries no value.
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, AbstExt::Absent)
    }

    /// Returns `true` if the token carries a value.
    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, AbstExt::Present(_))
    }

    /// Turns the token into an absent one.
    pub fn set_abst(&mut self) {
        *self = AbstExt::Absent;
    }

    /// Stores a present value.
    pub fn set_val(&mut self, value: T) {
        *self = AbstExt::Present(value);
    }

    /// Borrows the present value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            AbstExt::Present(v) => Some(v),
            AbstExt::Absent => None,
        }
    }

    /// Converts into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            AbstExt::Present(v) => Some(v),
            AbstExt::Absent => None,
        }
    }

    /// Returns the present value or `default` when absent.
    pub fn from_abst_ext(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }

    /// Applies `f` to a present value, keeping absence.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> AbstExt<U> {
        match self {
            AbstExt::Present(v) => AbstExt::Present(f(v)),
            AbstExt::Absent => AbstExt::Absent,
        }
    }

    /// Converts `&AbstExt<T>` to `AbstExt<&T>`.
    pub fn as_ref(&self) -> AbstExt<&T> {
        match self {
            AbstExt::Present(v) => AbstExt::Present(v),
            AbstExt::Absent => AbstExt::Absent,
        }
    }
}

impl<T> From<T> for AbstExt<T> {
    fn from(value: T) -> Self {
        AbstExt::Present(value)
    }
}

impl<T> From<Option<T>> for AbstExt<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => AbstExt::Present(v),
            None => AbstExt::Absent,
        }
    }
}

impl<T: fmt::Display> fmt::Display for AbstExt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstExt::Present(v) => write!(f, "{}", v),
            AbstExt::Absent => write!(f, "_"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_absent() {
        let a: AbstExt<u32> = AbstExt::default();
        assert!(a.is_absent());
        assert!(!a.is_present());
        assert_eq!(a.value(), None);
    }

    #[test]
    fn test_set_and_clear() {
        let mut a = AbstExt::absent();
        a.set_val(5u8);
        assert_eq!(a, AbstExt::Present(5));
        a.set_abst();
        assert_eq!(a, AbstExt::Absent);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(AbstExt::from(4), AbstExt::Present(4));
        assert_eq!(AbstExt::<i32>::from(None), AbstExt::Absent);
        assert_eq!(AbstExt::present("x").into_option(), Some("x"));
        assert_eq!(AbstExt::present(2).map(|v| v * 10), AbstExt::Present(20));
        assert_eq!(AbstExt::<i32>::absent().map(|v| v * 10), AbstExt::Absent);
    }

    #[test]
    fn test_serde() {
        let a = AbstExt::present(1.5f64);
        let json = serde_json::to_string(&a).unwrap();
        let back: AbstExt<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }
}
