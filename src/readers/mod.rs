pub mod table_reader;

pub use table_reader::{sniff_delimiter, TableReader};
