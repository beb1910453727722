//! Contains constraints, sorting options and other custom types.

mod constraints;
mod sorting;

pub use constraints::{
    ChirpConstraints, ConstraintViolation, RefreshTokenConstraints, UserConstraints,
};
pub use sorting::SortOrder;
