use itertools::Itertools;
use rust_decimal::Decimal;

impl<T> Aggregate for T where T: ?Sized {}

pub trait Aggregate {
    /// Middle value in ascending order, or the mean of the two middle values for an even count.
    #[must_use]
    fn median(self) -> Option<Decimal>
    where
        Self: Sized + IntoIterator<Item = Decimal>,
    {
        let mut values = self.into_iter().collect_vec();
        if values.is_empty() {
            return None;
        }
        values.sort_unstable();
        let index = values.len() / 2;
        if values.len() % 2 == 1 {
            return Some(values[index]);
        }
        let (lower, upper) = (values[index - 1], values[index]);
        let two = Decimal::TWO;
        lower
            .checked_add(upper)
            .and_then(|sum| sum.checked_div(two))
            .or_else(|| (lower / two).checked_add(upper / two))
    }
}
