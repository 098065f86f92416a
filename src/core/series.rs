mod aggregate;
mod bucketize;
mod values;

pub use self::{
    aggregate::Aggregate,
    bucketize::{Bucketize, bucketize},
    values::BucketValues,
};
