use crate::models::EnrichedObservation;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesStats {
    pub species: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegionCount {
    pub region_code: u32,
    pub region_name: String,
    pub measurements: usize,
}

#[derive(Debug)]
pub struct DatasetStatistics {
    pub total_records: usize,
    pub unique_stations: usize,
    pub unique_region_codes: usize,
    pub unique_region_names: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub hour_range: Option<(u32, u32)>,
    pub months: Vec<u32>,
    pub regions: Vec<RegionCount>,
    pub species: Vec<SpeciesStats>,
}

pub struct ConcentrationAnalyzer;

impl ConcentrationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, records: &[EnrichedObservation]) -> DatasetStatistics {
        let mut stations = HashSet::new();
        let mut region_names = HashSet::new();
        let mut months = BTreeSet::new();
        let mut regions: BTreeMap<(u32, &str), usize> = BTreeMap::new();
        let mut species_order: Vec<&str> = Vec::new();
        let mut species_values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut date_range: Option<(NaiveDate, NaiveDate)> = None;
        let mut hour_range: Option<(u32, u32)> = None;

        for record in records {
            stations.insert(record.station_id.as_str());
            region_names.insert(record.region_name.as_str());
            months.insert(record.month);
            *regions
                .entry((record.region_code, record.region_name.as_str()))
                .or_insert(0) += 1;

            let values = species_values
                .entry(record.species.as_str())
                .or_insert_with(|| {
                    species_order.push(record.species.as_str());
                    Vec::new()
                });
            values.push(record.concentration);

            date_range = Some(match date_range {
                Some((lo, hi)) => (lo.min(record.date), hi.max(record.date)),
                None => (record.date, record.date),
            });
            hour_range = Some(match hour_range {
                Some((lo, hi)) => (lo.min(record.hour), hi.max(record.hour)),
                None => (record.hour, record.hour),
            });
        }

        let species = species_order
            .iter()
            .filter_map(|name| {
                species_values
                    .remove(name)
                    .and_then(|values| species_stats(name, values))
            })
            .collect();

        DatasetStatistics {
            total_records: records.len(),
            unique_stations: stations.len(),
            unique_region_codes: regions.keys().map(|(code, _)| code).collect::<HashSet<_>>().len(),
            unique_region_names: region_names.len(),
            date_range,
            hour_range,
            months: months.into_iter().collect(),
            regions: regions
                .into_iter()
                .map(|((region_code, name), measurements)| RegionCount {
                    region_code,
                    region_name: name.to_string(),
                    measurements,
                })
                .collect(),
            species,
        }
    }
}

impl Default for ConcentrationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn species_stats(name: &str, mut values: Vec<f64>) -> Option<SpeciesStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    } else {
        values[count / 2]
    };

    Some(SpeciesStats {
        species: name.to_string(),
        count,
        min: values[0],
        max: values[count - 1],
        mean,
        median,
    })
}

impl DatasetStatistics {
    pub fn summary(&self) -> String {
        let period = match self.date_range {
            Some((start, end)) => format!("{} to {}", start, end),
            None => "n/a".to_string(),
        };
        let species: Vec<&str> = self.species.iter().map(|s| s.species.as_str()).collect();

        format!(
            "Records: {} total\n\
            Stations: {} unique\n\
            Regions: {} voivodeships ({} region codes)\n\
            Species: {}\n\
            Period: {}",
            self.total_records,
            self.unique_stations,
            self.unique_region_names,
            self.unique_region_codes,
            species.join(", "),
            period
        )
    }

    pub fn region_table(&self) -> String {
        let mut table = String::from("Region Mapping:\n");
        for region in &self.regions {
            table.push_str(&format!(
                "  Code {:>4} -> {:<25} ({} measurements)\n",
                region.region_code, region.region_name, region.measurements
            ));
        }
        table
    }

    pub fn temporal_summary(&self) -> String {
        let hours = match self.hour_range {
            Some((lo, hi)) => format!("{} to {}", lo, hi),
            None => "n/a".to_string(),
        };
        let months: Vec<String> = self.months.iter().map(u32::to_string).collect();
        format!("Temporal Fields:\n  - Hours: {}\n  - Months: [{}]", hours, months.join(", "))
    }

    pub fn detailed_summary(&self) -> String {
        let mut summary = format!("{}\n\nConcentrations by species (µg/m³):\n", self.summary());
        for stats in &self.species {
            summary.push_str(&format!(
                "  {} ({} values):\n\
                \x20   - Min: {:.2}\n\
                \x20   - Max: {:.2}\n\
                \x20   - Mean: {:.2}\n\
                \x20   - Median: {:.2}\n",
                stats.species, stats.count, stats.min, stats.max, stats.mean, stats.median
            ));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(station: &str, species: &str, conc: f64, day: u32, hour: u32) -> EnrichedObservation {
        EnrichedObservation::enrich(
            crate::models::Observation {
                station_id: station.to_string(),
                datetime: format!("2024-03-{:02} {:02}:00", day, hour),
                species: species.to_string(),
                concentration: conc,
            },
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_species_statistics() {
        let records = vec![
            record("PL0205001", "no2", 10.0, 1, 0),
            record("PL0205001", "no2", 20.0, 1, 1),
            record("PL0205001", "no2", 60.0, 1, 2),
            record("PL1", "pm2p5", 4.0, 2, 3),
            record("PL1", "pm2p5", 2.0, 2, 4),
        ];

        let stats = ConcentrationAnalyzer::new().analyze(&records);

        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.unique_stations, 2);
        assert_eq!(stats.species.len(), 2);

        let no2 = &stats.species[0];
        assert_eq!(no2.species, "no2");
        assert_eq!(no2.min, 10.0);
        assert_eq!(no2.max, 60.0);
        assert_eq!(no2.mean, 30.0);
        assert_eq!(no2.median, 20.0);

        let pm = &stats.species[1];
        assert_eq!(pm.median, 3.0);
        assert_eq!(pm.mean, 3.0);
    }

    #[test]
    fn test_region_and_temporal_coverage() {
        let records = vec![
            record("PL0205001", "no2", 1.0, 1, 5),
            record("PL0205002", "no2", 1.0, 3, 9),
            record("PL1", "no2", 1.0, 2, 7),
        ];

        let stats = ConcentrationAnalyzer::new().analyze(&records);

        assert_eq!(stats.unique_region_codes, 2);
        assert_eq!(stats.regions[0].region_code, 0);
        assert_eq!(stats.regions[0].region_name, "Region-0");
        assert_eq!(stats.regions[1].measurements, 2);
        assert_eq!(stats.hour_range, Some((5, 9)));
        assert_eq!(stats.months, vec![3]);
        assert_eq!(
            stats.date_range,
            Some((
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
            ))
        );
        assert!(stats.region_table().contains("Dolnośląskie"));
    }

    #[test]
    fn test_empty_dataset() {
        let stats = ConcentrationAnalyzer::new().analyze(&[]);
        assert_eq!(stats.total_records, 0);
        assert!(stats.species.is_empty());
        assert!(stats.summary().contains("Period: n/a"));
    }
}
