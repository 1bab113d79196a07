use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::ObservationTable;
use crate::processors::region_decoder::{
    extract_region_code, format_region_code, map_region_code_to_name,
};
use crate::processors::time_features::TimeFeatures;
use crate::utils::constants::{
    COL_CONCENTRATION, COL_DATETIME, COL_SPECIES, COL_STATION_ID, COUNTRY_NAME,
};

/// A cleaned measurement: no missing field, numeric concentration.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub station_id: String,
    pub datetime: String,
    pub species: String,
    pub concentration: f64,
}

/// Terminal row shape; field order is the column order of the final file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EnrichedObservation {
    #[validate(length(min = 1))]
    pub station_id: String,

    pub country_name: String,

    pub region_code: u32,

    #[validate(length(min = 1))]
    pub region_name: String,

    pub date: NaiveDate,

    #[validate(range(max = 23))]
    pub hour: u32,

    #[validate(range(min = 1, max = 12))]
    pub month: u32,

    pub day_of_week: String,

    #[validate(length(min = 1))]
    pub species: String,

    #[serde(rename = "conc_raw_micrograms_per_m3")]
    pub concentration: f64,
}

impl Observation {
    /// Typed view of a cleaned table. Fails on missing core columns or a
    /// field the cleaner should have removed.
    pub fn from_table(table: &ObservationTable) -> Result<Vec<Self>> {
        let station = table.require_column(COL_STATION_ID)?;
        let datetime = table.require_column(COL_DATETIME)?;
        let species = table.require_column(COL_SPECIES)?;
        let concentration = table.require_column(COL_CONCENTRATION)?;

        table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let field = |index: usize, name: &str| {
                    row[index].clone().ok_or_else(|| {
                        ProcessingError::InvalidFormat(format!(
                            "Row {} has no value for '{}'",
                            i + 1,
                            name
                        ))
                    })
                };
                let raw_concentration = field(concentration, COL_CONCENTRATION)?;
                let value = raw_concentration
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        ProcessingError::InvalidFormat(format!(
                            "Row {} has non-numeric concentration '{}'",
                            i + 1,
                            raw_concentration
                        ))
                    })?;

                Ok(Self {
                    station_id: field(station, COL_STATION_ID)?,
                    datetime: field(datetime, COL_DATETIME)?,
                    species: field(species, COL_SPECIES)?,
                    concentration: value,
                })
            })
            .collect()
    }
}

impl EnrichedObservation {
    /// Decodes the region and calendar fields of `observation`.
    /// `row` is the 1-based position used in timestamp errors.
    pub fn enrich(observation: Observation, row: usize) -> Result<Self> {
        let time = TimeFeatures::derive(&observation.datetime, row)?;
        let region_code = extract_region_code(&observation.station_id);

        Ok(Self {
            country_name: COUNTRY_NAME.to_string(),
            region_code,
            region_name: map_region_code_to_name(region_code),
            date: time.date,
            hour: time.hour,
            month: time.month,
            day_of_week: time.day_of_week().to_string(),
            station_id: observation.station_id,
            species: observation.species,
            concentration: observation.concentration,
        })
    }

    pub fn region_code_formatted(&self) -> String {
        format_region_code(&self.station_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(station_id: &str, datetime: &str) -> Observation {
        Observation {
            station_id: station_id.to_string(),
            datetime: datetime.to_string(),
            species: "no2".to_string(),
            concentration: 12.5,
        }
    }

    #[test]
    fn test_enrich_lower_silesia_station() {
        let enriched =
            EnrichedObservation::enrich(observation("PL0205001", "2024-03-01 00:00"), 1).unwrap();

        assert_eq!(enriched.country_name, "Poland");
        assert_eq!(enriched.region_code, 205);
        assert_eq!(enriched.region_name, "Dolnośląskie");
        assert_eq!(enriched.region_code_formatted(), "PL-205");
        assert_eq!(enriched.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(enriched.month, 3);
        assert_eq!(enriched.hour, 0);
        assert_eq!(enriched.day_of_week, "Friday");
        assert_eq!(enriched.species, "no2");
        assert_eq!(enriched.concentration, 12.5);
        assert!(enriched.validate().is_ok());
    }

    #[test]
    fn test_enrich_short_station_id() {
        let enriched =
            EnrichedObservation::enrich(observation("PL1", "2024-03-01 00:00"), 1).unwrap();
        assert_eq!(enriched.region_code, 0);
        assert_eq!(enriched.region_name, "Region-0");
        assert_eq!(enriched.region_code_formatted(), "PL-000");
    }

    #[test]
    fn test_enrich_fails_on_bad_timestamp() {
        assert!(EnrichedObservation::enrich(observation("PL0205001", "yesterday"), 3).is_err());
    }

    #[test]
    fn test_from_table_requires_core_columns() {
        let table = ObservationTable::new(vec!["station_id".to_string()]);
        let err = Observation::from_table(&table).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingColumn(ref c) if c == "datetime"));
    }

    #[test]
    fn test_from_table_reads_rows() {
        let columns = ["station_id", "datetime", "species", "conc_raw_micrograms_per_m3", "lat"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = ["PL0205001", "2024-03-01 00:00", "no2", "12.5", "51.1"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        let table = ObservationTable::from_parts(columns, vec![row]).unwrap();

        let observations = Observation::from_table(&table).unwrap();
        assert_eq!(observations, vec![observation("PL0205001", "2024-03-01 00:00")]);
    }
}
