pub mod concentration_analyzer;

pub use concentration_analyzer::{ConcentrationAnalyzer, DatasetStatistics, RegionCount, SpeciesStats};
