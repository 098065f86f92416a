use rust_decimal::Decimal;

use crate::core::Bucket;

/// The two readings of a bucket sequence: subtotals count a missing value as zero,
/// whereas statistics skip it altogether.
pub trait BucketValues {
    fn values_including_missing_as_zero(&self) -> impl Iterator<Item = Decimal> + '_;

    fn values_excluding_missing(&self) -> impl Iterator<Item = Decimal> + '_;
}

impl BucketValues for [Bucket] {
    fn values_including_missing_as_zero(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.iter().map(|bucket| bucket.value.unwrap_or_default())
    }

    fn values_excluding_missing(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.iter().filter_map(|bucket| bucket.value)
    }
}
