pub mod observation;
pub mod request;
pub mod table;

pub use observation::{EnrichedObservation, Observation};
pub use request::{RequestDescriptor, RequestTemplate};
pub use table::{parse_field, ObservationTable, Row};
