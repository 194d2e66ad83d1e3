pub mod catalog;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod output;
pub mod reports;

pub use catalog::DatasetCatalog;
pub use dataset::{DatasetId, TripRecord, TripSet, load};
pub use error::BikeshareError;
pub use filter::{DayConstraint, FilterRequest, MonthConstraint};
