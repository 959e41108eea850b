/// Declares a named group of joints, with element-wise helpers.
///
/// Every group gets `map`, `zip`, `iter`, [`FillExt`](super::FillExt), and element-wise
/// `Add`/`Sub` as well as scalar `Mul`/`Div`.
macro_rules! joint_group {
    ($(#[$meta:meta])* $name:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub struct $name<T> {
            $(pub $field: T,)+
        }

        impl<T> $name<T> {
            /// Transforms each joint using `f`.
            pub fn map<F, U>(self, mut f: F) -> $name<U>
            where
                F: FnMut(T) -> U,
            {
                $name {
                    $($field: f(self.$field),)+
                }
            }

            /// Pairs up the joints of `self` and `other`.
            pub fn zip<U>(self, other: $name<U>) -> $name<(T, U)> {
                $name {
                    $($field: (self.$field, other.$field),)+
                }
            }

            /// Returns an iterator over references to the joints, in declaration order.
            pub fn iter(&self) -> impl Iterator<Item = &T> {
                [$(&self.$field,)+].into_iter()
            }
        }

        impl<T: Clone> super::FillExt<T> for $name<T> {
            fn fill(value: T) -> Self {
                $name {
                    $($field: value.clone(),)+
                }
            }
        }

        impl<T: std::ops::Add<Output = T>> std::ops::Add for $name<T> {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                $name {
                    $($field: self.$field + rhs.$field,)+
                }
            }
        }

        impl<T: std::ops::Sub<Output = T>> std::ops::Sub for $name<T> {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                $name {
                    $($field: self.$field - rhs.$field,)+
                }
            }
        }

        impl<T: std::ops::Mul<Output = T> + Clone> std::ops::Mul<T> for $name<T> {
            type Output = Self;

            fn mul(self, rhs: T) -> Self {
                $name {
                    $($field: self.$field * rhs.clone(),)+
                }
            }
        }

        impl<T: std::ops::Div<Output = T> + Clone> std::ops::Div<T> for $name<T> {
            type Output = Self;

            fn div(self, rhs: T) -> Self {
                $name {
                    $($field: self.$field / rhs.clone(),)+
                }
            }
        }
    };
}
