//! Element kinds a buffer can store.
//!
//! Operations whose meaning depends on the value range (histograms, the
//! quantile filter, inversion, lookup tables) dispatch on [`Element::KIND`].
//! The kind is a constant, so the branch is resolved per monomorphization.

use std::fmt;

/// Closed set of element families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Bool,
    Unsigned,
    Signed,
    Float,
}

impl ElementKind {
    /// Bool and unsigned kinds have a dense, ordered, zero-based value range
    /// that a histogram can index directly.
    pub const fn is_ranked(self) -> bool {
        matches!(self, ElementKind::Bool | ElementKind::Unsigned)
    }

    pub const fn is_integral(self) -> bool {
        !matches!(self, ElementKind::Float)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Bool => "bool",
            ElementKind::Unsigned => "unsigned",
            ElementKind::Signed => "signed",
            ElementKind::Float => "float",
        };
        f.write_str(name)
    }
}

/// Scalar stored in a [`Matrix`](crate::Matrix).
pub trait Element: Copy + PartialEq + PartialOrd + fmt::Debug + Send + Sync + 'static {
    const KIND: ElementKind;
    const ZERO: Self;
    /// Smallest representable value (most negative for signed and float kinds).
    const MIN: Self;
    const MAX: Self;
    /// Number of distinct values for ranked kinds, `None` otherwise.
    const RANKS: Option<usize>;

    fn to_f64(self) -> f64;

    /// Saturating conversion. Integral kinds truncate toward zero.
    fn from_f64(value: f64) -> Self;

    /// Histogram bin of a ranked value. Zero for unranked kinds.
    fn rank(self) -> usize;

    fn from_rank(rank: usize) -> Self;

    /// `max - value` for ranked kinds, `None` where no complement is defined.
    fn complement(self) -> Option<Self>;

    /// Counter value truncated to the element's width.
    fn wrapping_from(counter: u64) -> Self;

    /// Bitwise equality, used by buffer comparison.
    fn same_bits(self, other: Self) -> bool {
        self == other
    }

    /// Conversion that rounds half away from zero for integral kinds.
    fn from_f64_rounded(value: f64) -> Self {
        if Self::KIND.is_integral() {
            Self::from_f64(value.round())
        } else {
            Self::from_f64(value)
        }
    }
}

impl Element for bool {
    const KIND: ElementKind = ElementKind::Bool;
    const ZERO: Self = false;
    const MIN: Self = false;
    const MAX: Self = true;
    const RANKS: Option<usize> = Some(2);

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn rank(self) -> usize {
        self as usize
    }

    fn from_rank(rank: usize) -> Self {
        rank != 0
    }

    fn complement(self) -> Option<Self> {
        Some(!self)
    }

    fn wrapping_from(counter: u64) -> Self {
        counter & 1 == 1
    }
}

macro_rules! unsigned_element {
    ($($t:ty),*) => {$(
        impl Element for $t {
            const KIND: ElementKind = ElementKind::Unsigned;
            const ZERO: Self = 0;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;
            const RANKS: Option<usize> = Some(<$t>::MAX as usize + 1);

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn rank(self) -> usize {
                self as usize
            }

            fn from_rank(rank: usize) -> Self {
                rank.min(<$t>::MAX as usize) as $t
            }

            fn complement(self) -> Option<Self> {
                Some(<$t>::MAX - self)
            }

            fn wrapping_from(counter: u64) -> Self {
                counter as $t
            }
        }
    )*};
}

macro_rules! signed_element {
    ($($t:ty),*) => {$(
        impl Element for $t {
            const KIND: ElementKind = ElementKind::Signed;
            const ZERO: Self = 0;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;
            const RANKS: Option<usize> = None;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn rank(self) -> usize {
                0
            }

            fn from_rank(rank: usize) -> Self {
                rank.min(<$t>::MAX as usize) as $t
            }

            fn complement(self) -> Option<Self> {
                None
            }

            fn wrapping_from(counter: u64) -> Self {
                counter as $t
            }
        }
    )*};
}

macro_rules! float_element {
    ($($t:ty),*) => {$(
        impl Element for $t {
            const KIND: ElementKind = ElementKind::Float;
            const ZERO: Self = 0.0;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;
            const RANKS: Option<usize> = None;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn rank(self) -> usize {
                0
            }

            fn from_rank(rank: usize) -> Self {
                rank as $t
            }

            fn complement(self) -> Option<Self> {
                None
            }

            fn wrapping_from(counter: u64) -> Self {
                counter as $t
            }

            fn same_bits(self, other: Self) -> bool {
                self.to_bits() == other.to_bits()
            }
        }
    )*};
}

unsigned_element!(u8, u16);
signed_element!(i8, i16, i32);
float_element!(f32, f64);
