use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::utils::constants::{ALL_DAYS, ALL_MONTHS};

/// A single retrieval request for the observation-site dataset.
///
/// Built once per attempt (whole year or single month) and never mutated;
/// the serialized form is the provider's request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct RequestDescriptor {
    #[validate(length(min = 1))]
    variable: Vec<String>,

    #[validate(length(equal = 1))]
    country: Vec<String>,

    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    data_type: Vec<String>,

    #[validate(length(min = 1))]
    leadtime_hour: Vec<String>,

    #[validate(length(equal = 1))]
    year: Vec<String>,

    #[validate(length(min = 1), custom(function = "validate_months"))]
    month: Vec<String>,

    #[validate(length(min = 1), custom(function = "validate_days"))]
    day: Vec<String>,
}

/// The fixed part of every request: what to fetch and where from.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    pub variables: Vec<String>,
    pub country: String,
    pub data_type: String,
    pub leadtime_hour: String,
    pub year: i32,
}

impl RequestDescriptor {
    /// Request covering every month of the template's year.
    pub fn whole_year(template: &RequestTemplate) -> Result<Self> {
        Self::build(template, ALL_MONTHS.iter().map(|m| m.to_string()).collect())
    }

    /// Request covering one month (`"01"`..`"12"`) of the template's year.
    pub fn single_month(template: &RequestTemplate, month: &str) -> Result<Self> {
        Self::build(template, vec![month.to_string()])
    }

    fn build(template: &RequestTemplate, month: Vec<String>) -> Result<Self> {
        let descriptor = Self {
            variable: template.variables.clone(),
            country: vec![template.country.clone()],
            data_type: vec![template.data_type.clone()],
            leadtime_hour: vec![template.leadtime_hour.clone()],
            year: vec![template.year.to_string()],
            month,
            // All 31 days regardless of month length; the provider drops invalid dates.
            day: ALL_DAYS.iter().map(|d| d.to_string()).collect(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn variables(&self) -> &[String] {
        &self.variable
    }

    pub fn country(&self) -> &str {
        &self.country[0]
    }

    pub fn year(&self) -> &str {
        &self.year[0]
    }

    pub fn months(&self) -> &[String] {
        &self.month
    }

    pub fn days(&self) -> &[String] {
        &self.day
    }

    pub fn is_single_month(&self) -> bool {
        self.month.len() == 1
    }
}

#[allow(clippy::ptr_arg)]
fn validate_months(months: &Vec<String>) -> std::result::Result<(), ValidationError> {
    validate_two_digit_range(months, 1, 12, "month")
}

#[allow(clippy::ptr_arg)]
fn validate_days(days: &Vec<String>) -> std::result::Result<(), ValidationError> {
    validate_two_digit_range(days, 1, 31, "day")
}

fn validate_two_digit_range(
    values: &[String],
    min: u32,
    max: u32,
    code: &'static str,
) -> std::result::Result<(), ValidationError> {
    let in_range = |v: &String| {
        v.len() == 2 && v.parse::<u32>().is_ok_and(|n| (min..=max).contains(&n))
    };
    if values.iter().all(in_range) {
        Ok(())
    } else {
        Err(ValidationError::new(code))
    }
}
