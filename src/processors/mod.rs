pub mod aggregator;
pub mod browser;
pub mod categorizer;
pub mod filter;

pub use aggregator::{
    format_mean, group_mean, mean_by_city, mean_by_date, overall_mean, GroupKey, GroupMean,
    GroupValue,
};
pub use browser::browse_tables;
pub use categorizer::categorize;
pub use filter::{distinct_values, filter, Dimension, Selection};
