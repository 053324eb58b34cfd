/// An associative binary operation.
///
/// `a.concat(&b).concat(&c)` must be equivalent to `a.concat(&b.concat(&c))`.
pub trait Semigroup {
    fn concat(&self, other: &Self) -> Self;
}

/// A [`Semigroup`] with an identity element.
///
/// Both `m.concat(&M::empty())` and `M::empty().concat(&m)` must be equivalent to `m`.
pub trait Monoid: Semigroup + Sized {
    fn empty() -> Self;

    /// Folds `values` with [`Semigroup::concat`], starting from [`Monoid::empty`].
    fn concat_all<I: IntoIterator<Item = Self>>(values: I) -> Self {
        values
            .into_iter()
            .fold(Self::empty(), |acc, value| acc.concat(&value))
    }
}
