use std::cell::OnceCell;
use std::collections::HashSet;
use std::str::FromStr;

use log::{debug, trace};
use serde::Serialize;

use crate::error::{InsuranceError, Result};
use crate::records::{AGE, BMI, CHARGES, CHILDREN, FEMALE, MALE, REGION, SEX, SMOKER, SMOKES};
use crate::stats::{mean, percentage, round2};

/// The seven parallel text columns as read from the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawColumns {
    pub age: Vec<String>,
    pub sex: Vec<String>,
    pub bmi: Vec<String>,
    pub children: Vec<String>,
    pub smoker: Vec<String>,
    pub region: Vec<String>,
    pub charges: Vec<String>,
}

impl RawColumns {
    fn lengths(&self) -> [(&'static str, usize); 7] {
        [
            (AGE, self.age.len()),
            (SEX, self.sex.len()),
            (BMI, self.bmi.len()),
            (CHILDREN, self.children.len()),
            (SMOKER, self.smoker.len()),
            (REGION, self.region.len()),
            (CHARGES, self.charges.len()),
        ]
    }
}

/// Column-oriented typed view of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientColumns {
    pub age: Vec<i64>,
    pub sex: Vec<String>,
    pub bmi: Vec<f64>,
    pub children: Vec<u32>,
    pub smoker: Vec<String>,
    pub region: Vec<String>,
    pub charges: Vec<f64>,
}

/// Borrowed values of a single typed column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValues<'a> {
    Int(&'a [i64]),
    Count(&'a [u32]),
    Float(&'a [f64]),
    Text(&'a [String]),
}

impl ColumnValues<'_> {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Count(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClientColumns {
    /// Look up a column by its header name.
    pub fn get(&self, name: &str) -> Option<ColumnValues<'_>> {
        let values = match name {
            AGE => ColumnValues::Int(&self.age),
            SEX => ColumnValues::Text(&self.sex),
            BMI => ColumnValues::Float(&self.bmi),
            CHILDREN => ColumnValues::Count(&self.children),
            SMOKER => ColumnValues::Text(&self.smoker),
            REGION => ColumnValues::Text(&self.region),
            CHARGES => ColumnValues::Float(&self.charges),
            _ => return None,
        };
        Some(values)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionBmi {
    pub region: String,
    pub average_bmi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverweightRegions {
    pub most: RegionBmi,
    pub least: RegionBmi,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmokerShare {
    pub male: f64,
    pub female: f64,
}

/// Immutable table of insured clients with read-only aggregation queries.
///
/// Raw text is kept as loaded; the typed view is built on first use and
/// shared by every query afterwards.
#[derive(Debug)]
pub struct InsuranceDataset {
    raw: RawColumns,
    typed: OnceCell<ClientColumns>,
}

impl InsuranceDataset {
    /// Wrap loaded columns, failing if they do not all have the same length.
    pub fn new(raw: RawColumns) -> Result<Self> {
        let lengths = raw.lengths();
        let expected = lengths[0].1;
        if let Some((column, found)) = lengths.iter().find(|(_, len)| *len != expected) {
            return Err(InsuranceError::Validation {
                column: column.to_string(),
                expected,
                found: *found,
            });
        }
        debug!("dataset built with {} clients", expected);
        Ok(InsuranceDataset {
            raw,
            typed: OnceCell::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.raw.age.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed dictionary view, converted once and cached.
    pub fn columns(&self) -> Result<&ClientColumns> {
        if let Some(columns) = self.typed.get() {
            return Ok(columns);
        }
        let columns = self.convert()?;
        trace!("typed view cached for {} clients", self.len());
        Ok(self.typed.get_or_init(|| columns))
    }

    fn convert(&self) -> Result<ClientColumns> {
        Ok(ClientColumns {
            age: parse_column(AGE, &self.raw.age)?,
            sex: self.raw.sex.clone(),
            bmi: parse_measure(BMI, &self.raw.bmi)?,
            children: parse_column(CHILDREN, &self.raw.children)?,
            smoker: self.raw.smoker.clone(),
            region: self.raw.region.clone(),
            charges: parse_measure(CHARGES, &self.raw.charges)?,
        })
    }

    /// Distinct regions in order of first appearance.
    pub fn regions(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.raw
            .region
            .iter()
            .map(String::as_str)
            .filter(|region| seen.insert(*region))
            .collect()
    }

    /// Rounded average BMI of every region present, in first-appearance order.
    pub fn region_bmi_averages(&self) -> Result<Vec<RegionBmi>> {
        let columns = self.columns()?;
        let regions = self.regions();
        let mut groups: Vec<Vec<f64>> = vec![Vec::new(); regions.len()];
        for (bmi, region) in columns.bmi.iter().zip(&columns.region) {
            if let Some(idx) = regions.iter().position(|r| *r == region.as_str()) {
                groups[idx].push(*bmi);
            }
        }

        regions
            .iter()
            .zip(groups)
            .map(|(region, bmis)| {
                let average =
                    mean(&bmis).ok_or_else(|| InsuranceError::EmptyGroup(region.to_string()))?;
                trace!("region {} has {} clients", region, bmis.len());
                Ok(RegionBmi {
                    region: region.to_string(),
                    average_bmi: round2(average),
                })
            })
            .collect()
    }

    /// Regions with the highest and lowest rounded average BMI.
    ///
    /// Averages are ordered as `(average, region)` pairs, so ties go to the
    /// lexicographically last region for `most` and the first for `least`.
    pub fn most_and_least_overweight_region(&self) -> Result<OverweightRegions> {
        let mut averages = self.region_bmi_averages()?;
        averages.sort_by(|a, b| {
            a.average_bmi
                .total_cmp(&b.average_bmi)
                .then_with(|| a.region.cmp(&b.region))
        });
        let (Some(least), Some(most)) = (averages.first(), averages.last()) else {
            return Err(InsuranceError::EmptyResult("no regions in dataset".to_string()));
        };
        debug!(
            "most overweight region {} ({}), least {} ({})",
            most.region, most.average_bmi, least.region, least.average_bmi
        );
        Ok(OverweightRegions {
            most: most.clone(),
            least: least.clone(),
        })
    }

    /// Percentage of smokers among male and among female clients.
    ///
    /// Clients with any other sex value are left out of both denominators.
    pub fn smoker_percentage_by_sex(&self) -> Result<SmokerShare> {
        let mut males = 0;
        let mut females = 0;
        let mut male_smokers = 0;
        let mut female_smokers = 0;
        for (sex, smoker) in self.raw.sex.iter().zip(&self.raw.smoker) {
            let smokes = smoker == SMOKES;
            match sex.as_str() {
                MALE => {
                    males += 1;
                    male_smokers += usize::from(smokes);
                }
                FEMALE => {
                    females += 1;
                    female_smokers += usize::from(smokes);
                }
                other => trace!("ignoring sex value {:?}", other),
            }
        }

        let male = percentage(male_smokers, males)
            .ok_or_else(|| InsuranceError::EmptyGroup(MALE.to_string()))?;
        let female = percentage(female_smokers, females)
            .ok_or_else(|| InsuranceError::EmptyGroup(FEMALE.to_string()))?;
        Ok(SmokerShare { male, female })
    }

    /// Rounded mean BMI of clients strictly older than `threshold`.
    ///
    /// A threshold at or above the oldest client's age is out of range.
    pub fn average_bmi_above_age(&self, threshold: i64) -> Result<f64> {
        let columns = self.columns()?;
        let max_age = columns
            .age
            .iter()
            .copied()
            .max()
            .ok_or_else(|| InsuranceError::EmptyResult("dataset has no clients".to_string()))?;
        if threshold >= max_age {
            return Err(InsuranceError::OutOfRange { threshold, max_age });
        }

        let bmis: Vec<f64> = columns
            .age
            .iter()
            .zip(&columns.bmi)
            .filter(|(age, _)| **age > threshold)
            .map(|(_, bmi)| *bmi)
            .collect();
        debug!("{} clients older than {}", bmis.len(), threshold);
        mean(&bmis)
            .map(round2)
            .ok_or_else(|| InsuranceError::EmptyResult(format!("no clients older than {}", threshold)))
    }

    /// `(age, charge)` pairs in record order, ready for a scatter plot.
    pub fn charges_by_age(&self) -> Result<Vec<(i64, f64)>> {
        let columns = self.columns()?;
        Ok(columns
            .age
            .iter()
            .copied()
            .zip(columns.charges.iter().copied())
            .collect())
    }
}

fn parse_column<T: FromStr>(column: &str, values: &[String]) -> Result<Vec<T>> {
    parse_column_with(column, values, |_: &T| true)
}

/// Float column; `NaN` and infinities are rejected like any other bad value.
fn parse_measure(column: &str, values: &[String]) -> Result<Vec<f64>> {
    parse_column_with(column, values, |v: &f64| v.is_finite())
}

fn parse_column_with<T, F>(column: &str, values: &[String], accept: F) -> Result<Vec<T>>
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    values
        .iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .trim()
                .parse::<T>()
                .ok()
                .filter(|parsed| accept(parsed))
                .ok_or_else(|| InsuranceError::Parse {
                    row,
                    column: column.to_string(),
                    value: value.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(rows: &[(&str, &str, &str, &str, &str, &str, &str)]) -> RawColumns {
        let mut raw = RawColumns::default();
        for (age, sex, bmi, children, smoker, region, charges) in rows {
            raw.age.push(age.to_string());
            raw.sex.push(sex.to_string());
            raw.bmi.push(bmi.to_string());
            raw.children.push(children.to_string());
            raw.smoker.push(smoker.to_string());
            raw.region.push(region.to_string());
            raw.charges.push(charges.to_string());
        }
        raw
    }

    fn three_clients() -> InsuranceDataset {
        InsuranceDataset::new(columns(&[
            ("25", "male", "20.0", "0", "yes", "southwest", "1000.5"),
            ("30", "male", "30.0", "1", "no", "southwest", "2000.25"),
            ("40", "female", "10.0", "2", "yes", "southeast", "3000"),
        ]))
        .unwrap()
    }

    #[test]
    fn rejects_columns_of_different_length() {
        let mut raw = columns(&[("25", "male", "20.0", "0", "yes", "southwest", "1000")]);
        raw.charges.push("12.0".to_string());
        let err = InsuranceDataset::new(raw).unwrap_err();
        assert!(matches!(
            err,
            InsuranceError::Validation { ref column, expected: 1, found: 2 } if column == "charges"
        ));
    }

    #[test]
    fn regions_in_first_occurrence_order() {
        let dataset = InsuranceDataset::new(columns(&[
            ("19", "female", "27.9", "0", "yes", "southwest", "16884.924"),
            ("18", "male", "33.77", "1", "no", "southeast", "1725.5523"),
            ("28", "male", "33.0", "3", "no", "southeast", "4449.462"),
            ("33", "male", "22.705", "0", "no", "northwest", "21984.47061"),
            ("31", "female", "25.74", "0", "no", "southwest", "3756.6216"),
            ("37", "female", "27.74", "3", "no", "northeast", "7281.5056"),
        ]))
        .unwrap();
        assert_eq!(
            dataset.regions(),
            vec!["southwest", "southeast", "northwest", "northeast"]
        );
    }

    #[test]
    fn most_and_least_overweight() {
        let extremes = three_clients().most_and_least_overweight_region().unwrap();
        assert_eq!(
            extremes.most,
            RegionBmi {
                region: "southwest".to_string(),
                average_bmi: 25.0
            }
        );
        assert_eq!(
            extremes.least,
            RegionBmi {
                region: "southeast".to_string(),
                average_bmi: 10.0
            }
        );
    }

    #[test]
    fn extremes_bound_every_region_average() {
        let dataset = InsuranceDataset::new(columns(&[
            ("19", "female", "27.9", "0", "yes", "southwest", "1"),
            ("18", "male", "33.77", "1", "no", "southeast", "1"),
            ("28", "male", "33.0", "3", "no", "southeast", "1"),
            ("33", "male", "22.705", "0", "no", "northwest", "1"),
            ("37", "female", "27.74", "3", "no", "northeast", "1"),
            ("60", "female", "25.84", "0", "no", "northwest", "1"),
        ]))
        .unwrap();
        let averages = dataset.region_bmi_averages().unwrap();
        let extremes = dataset.most_and_least_overweight_region().unwrap();
        for region in &averages {
            assert!(extremes.most.average_bmi >= region.average_bmi);
            assert!(extremes.least.average_bmi <= region.average_bmi);
        }
        assert_eq!(extremes.most.region, "southeast");
        assert_eq!(extremes.least.region, "northwest");
        assert_eq!(extremes.least.average_bmi, 24.27);
    }

    #[test]
    fn tied_averages_break_on_region_name() {
        let dataset = InsuranceDataset::new(columns(&[
            ("20", "male", "25.0", "0", "no", "southwest", "1"),
            ("21", "male", "25.0", "0", "no", "northeast", "1"),
            ("22", "male", "25.0", "0", "no", "southeast", "1"),
        ]))
        .unwrap();
        let extremes = dataset.most_and_least_overweight_region().unwrap();
        assert_eq!(extremes.most.region, "southwest");
        assert_eq!(extremes.least.region, "northeast");
    }

    #[test]
    fn regions_are_discovered_from_data() {
        let dataset = InsuranceDataset::new(columns(&[
            ("20", "male", "31.0", "0", "no", "midwest", "1"),
            ("21", "male", "29.0", "0", "no", "midwest", "1"),
            ("22", "female", "22.5", "0", "no", "pacific", "1"),
        ]))
        .unwrap();
        let extremes = dataset.most_and_least_overweight_region().unwrap();
        assert_eq!(extremes.most.region, "midwest");
        assert_eq!(extremes.most.average_bmi, 30.0);
        assert_eq!(extremes.least.region, "pacific");
    }

    #[test]
    fn empty_dataset_has_no_extremes() {
        let dataset = InsuranceDataset::new(RawColumns::default()).unwrap();
        assert!(dataset.is_empty());
        assert!(matches!(
            dataset.most_and_least_overweight_region(),
            Err(InsuranceError::EmptyResult(_))
        ));
    }

    #[test]
    fn typed_view_converts_numeric_columns() {
        let dataset = three_clients();
        let view = dataset.columns().unwrap();
        assert_eq!(view.age, vec![25, 30, 40]);
        assert_eq!(view.bmi, vec![20.0, 30.0, 10.0]);
        assert_eq!(view.children, vec![0, 1, 2]);
        assert_eq!(view.charges, vec![1000.5, 2000.25, 3000.0]);
        assert_eq!(view.get("age").map(|c| c.len()), Some(dataset.len()));
        assert!(matches!(view.get("region"), Some(ColumnValues::Text(_))));
        assert_eq!(view.get("regions"), None);
    }

    #[test]
    fn typed_view_serializes_by_column() {
        let dataset = three_clients();
        let value = serde_json::to_value(dataset.columns().unwrap()).unwrap();
        assert_eq!(value["age"], serde_json::json!([25, 30, 40]));
        assert_eq!(value["region"][2], "southeast");
    }

    #[test]
    fn typed_view_is_cached() {
        let dataset = three_clients();
        let first = dataset.columns().unwrap() as *const ClientColumns;
        let second = dataset.columns().unwrap() as *const ClientColumns;
        assert_eq!(first, second);
    }

    #[test]
    fn non_numeric_field_names_row() {
        let dataset = InsuranceDataset::new(columns(&[
            ("25", "male", "20.0", "0", "yes", "southwest", "1"),
            ("thirty", "male", "30.0", "1", "no", "southwest", "2"),
        ]))
        .unwrap();
        let err = dataset.columns().unwrap_err();
        assert!(matches!(
            err,
            InsuranceError::Parse { row: 1, ref column, ref value } if column == "age" && value == "thirty"
        ));
        // region listing does not need the typed view
        assert_eq!(dataset.regions(), vec!["southwest"]);
    }

    #[test]
    fn non_finite_measures_are_rejected() {
        for (bmi, charges, column) in [("NaN", "1", "bmi"), ("22.0", "inf", "charges")] {
            let dataset = InsuranceDataset::new(columns(&[
                ("25", "male", "20.0", "0", "yes", "southwest", "1"),
                ("30", "female", bmi, "1", "no", "southwest", charges),
            ]))
            .unwrap();
            let err = dataset.average_bmi_above_age(20).unwrap_err();
            assert!(matches!(
                err,
                InsuranceError::Parse { row: 1, column: ref c, .. } if c.as_str() == column
            ));
            assert!(dataset.most_and_least_overweight_region().is_err());
        }
    }

    #[test]
    fn smoker_percentage_per_sex() {
        let share = three_clients().smoker_percentage_by_sex().unwrap();
        assert_eq!(share, SmokerShare { male: 50.0, female: 100.0 });
    }

    #[test]
    fn smoker_percentage_requires_both_sexes() {
        let dataset = InsuranceDataset::new(columns(&[
            ("25", "male", "20.0", "0", "yes", "southwest", "1"),
            ("26", "male", "21.0", "0", "yes", "southwest", "1"),
            ("27", "other", "22.0", "0", "yes", "southwest", "1"),
        ]))
        .unwrap();
        let err = dataset.smoker_percentage_by_sex().unwrap_err();
        assert!(matches!(err, InsuranceError::EmptyGroup(ref sex) if sex == "female"));
    }

    #[test]
    fn all_smokers_is_one_hundred_percent() {
        let dataset = InsuranceDataset::new(columns(&[
            ("25", "female", "20.0", "0", "yes", "southwest", "1"),
            ("26", "female", "21.0", "0", "yes", "northwest", "1"),
            ("27", "male", "22.0", "0", "no", "southwest", "1"),
        ]))
        .unwrap();
        let share = dataset.smoker_percentage_by_sex().unwrap();
        assert_eq!(share.female, 100.0);
        assert_eq!(share.male, 0.0);
    }

    #[test]
    fn average_bmi_above_age_filters_strictly() {
        let dataset = three_clients();
        assert_eq!(dataset.average_bmi_above_age(26).unwrap(), 20.0);
        assert_eq!(dataset.average_bmi_above_age(30).unwrap(), 10.0);
        assert_eq!(dataset.average_bmi_above_age(39).unwrap(), 10.0);
    }

    #[test]
    fn threshold_below_youngest_covers_everyone() {
        assert_eq!(three_clients().average_bmi_above_age(18).unwrap(), 20.0);
    }

    #[test]
    fn threshold_at_or_above_oldest_is_out_of_range() {
        let dataset = three_clients();
        for threshold in [40, 64] {
            let err = dataset.average_bmi_above_age(threshold).unwrap_err();
            assert!(matches!(
                err,
                InsuranceError::OutOfRange { max_age: 40, threshold: t } if t == threshold
            ));
        }
    }

    #[test]
    fn threshold_query_on_empty_dataset() {
        let dataset = InsuranceDataset::new(RawColumns::default()).unwrap();
        assert!(matches!(
            dataset.average_bmi_above_age(30),
            Err(InsuranceError::EmptyResult(_))
        ));
    }

    #[test]
    fn charges_pair_with_ages() {
        let pairs = three_clients().charges_by_age().unwrap();
        assert_eq!(pairs, vec![(25, 1000.5), (30, 2000.25), (40, 3000.0)]);
    }

    #[test]
    fn queries_are_idempotent() {
        let dataset = three_clients();
        assert_eq!(
            dataset.most_and_least_overweight_region().unwrap(),
            dataset.most_and_least_overweight_region().unwrap()
        );
        assert_eq!(
            dataset.smoker_percentage_by_sex().unwrap(),
            dataset.smoker_percentage_by_sex().unwrap()
        );
    }
}
