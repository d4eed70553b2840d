pub mod observation;
pub mod table;
pub mod tabular;

pub use observation::{TemperatureBucket, WeatherObservation};
pub use table::{TableFetch, TableIdentifier};
pub use tabular::{Scalar, TabularResult};
