//! Promote-compute-round: every operator decodes its operands to the
//! format's reference float, computes there and encodes the result through
//! the format's rounding policy.
//!
//! A format opts in by providing inherent `encode(reference) -> Self`,
//! `decode(self) -> reference` and `to_f64(self) -> f64`.

macro_rules! arithmetic_impl {
    ($ty : ty, $reference : ty, [$($generics : tt)*]) => {
        arithmetic_impl!(@binary $ty, $reference, [$($generics)*], Add, add, AddAssign, add_assign, +);
        arithmetic_impl!(@binary $ty, $reference, [$($generics)*], Sub, sub, SubAssign, sub_assign, -);
        arithmetic_impl!(@binary $ty, $reference, [$($generics)*], Mul, mul, MulAssign, mul_assign, *);
        arithmetic_impl!(@binary $ty, $reference, [$($generics)*], Div, div, DivAssign, div_assign, /);
        arithmetic_impl!(@binary $ty, $reference, [$($generics)*], Rem, rem, RemAssign, rem_assign, %);

        impl<$($generics)*> ::std::ops::Neg for $ty {
            type Output = Self;

            fn neg(self) -> Self {
                Self::encode(-self.decode())
            }
        }

        impl<$($generics)*> ::std::cmp::PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.decode() == other.decode()
            }
        }

        impl<$($generics)*> ::std::cmp::PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
                self.decode().partial_cmp(&other.decode())
            }
        }

        impl<$($generics)*> ::std::cmp::PartialEq<f64> for $ty {
            fn eq(&self, other: &f64) -> bool {
                self.to_f64() == *other
            }
        }

        impl<$($generics)*> ::std::cmp::PartialOrd<f64> for $ty {
            fn partial_cmp(&self, other: &f64) -> Option<::std::cmp::Ordering> {
                self.to_f64().partial_cmp(other)
            }
        }

        impl<$($generics)*> ::std::cmp::PartialEq<$ty> for f64 {
            fn eq(&self, other: &$ty) -> bool {
                *self == other.to_f64()
            }
        }

        impl<$($generics)*> ::std::cmp::PartialOrd<$ty> for f64 {
            fn partial_cmp(&self, other: &$ty) -> Option<::std::cmp::Ordering> {
                self.partial_cmp(&other.to_f64())
            }
        }

        impl<$($generics)*> ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.decode(), f)
            }
        }

        impl<$($generics)*> ::std::iter::Sum for $ty {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::encode(0.0), |acc, x| acc + x)
            }
        }

        impl<$($generics)*> ::std::iter::Product for $ty {
            fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::encode(1.0), |acc, x| acc * x)
            }
        }

        impl<$($generics)*> From<$reference> for $ty {
            fn from(value: $reference) -> Self {
                Self::encode(value)
            }
        }

        impl<$($generics)*> From<$ty> for f64 {
            fn from(value: $ty) -> f64 {
                value.to_f64()
            }
        }

        impl<$($generics)*> From<$ty> for f32 {
            fn from(value: $ty) -> f32 {
                value.to_f64() as f32
            }
        }

        arithmetic_impl!(@from_int $ty, $reference, [$($generics)*], i8);
        arithmetic_impl!(@from_int $ty, $reference, [$($generics)*], i16);
        arithmetic_impl!(@from_int $ty, $reference, [$($generics)*], i32);
        arithmetic_impl!(@from_int $ty, $reference, [$($generics)*], u8);
        arithmetic_impl!(@from_int $ty, $reference, [$($generics)*], u16);
    };

    (@binary $ty : ty, $reference : ty, [$($generics : tt)*],
        $op_trait : ident, $op : ident, $assign_trait : ident, $assign : ident, $sym : tt) => {
        impl<$($generics)*> ::std::ops::$op_trait for $ty {
            type Output = Self;

            fn $op(self, rhs: Self) -> Self {
                Self::encode(self.decode() $sym rhs.decode())
            }
        }

        impl<$($generics)*> ::std::ops::$op_trait<$reference> for $ty {
            type Output = Self;

            fn $op(self, rhs: $reference) -> Self {
                Self::encode(self.decode() $sym rhs)
            }
        }

        impl<$($generics)*> ::std::ops::$op_trait<$ty> for $reference {
            type Output = $ty;

            fn $op(self, rhs: $ty) -> $ty {
                <$ty>::encode(self $sym rhs.decode())
            }
        }

        impl<$($generics)*> ::std::ops::$assign_trait for $ty {
            fn $assign(&mut self, rhs: Self) {
                *self = Self::encode(self.decode() $sym rhs.decode());
            }
        }

        impl<$($generics)*> ::std::ops::$assign_trait<$reference> for $ty {
            fn $assign(&mut self, rhs: $reference) {
                *self = Self::encode(self.decode() $sym rhs);
            }
        }
    };

    (@from_int $ty : ty, $reference : ty, [$($generics : tt)*], $int : ty) => {
        impl<$($generics)*> From<$int> for $ty {
            fn from(value: $int) -> Self {
                Self::encode(value as $reference)
            }
        }
    };
}

pub(crate) use arithmetic_impl;
