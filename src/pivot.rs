use anyhow::Result;
use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};
use tracing::debug;

use crate::table::{write_csv_atomic, OutputTable};

/// The combined table reshaped to one row per country and one column per year.
///
/// This is the `country,<year>,<year>,...` layout the dashboard charts read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearPivot {
    years: Vec<String>,
    countries: Vec<(String, HashMap<String, String>)>,
}

impl YearPivot {
    /// Build the pivot. Countries keep first-appearance order. When a
    /// (country, year) pair repeats, the later row wins.
    pub fn from_table(table: &OutputTable) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut countries: Vec<(String, HashMap<String, String>)> = Vec::new();
        let mut years: BTreeSet<&str> = BTreeSet::new();

        for rec in table.rows() {
            let slot = *index.entry(rec.country.as_str()).or_insert_with(|| {
                countries.push((rec.country.clone(), HashMap::new()));
                countries.len() - 1
            });
            countries[slot]
                .1
                .insert(rec.years.clone(), rec.number.clone());
            years.insert(rec.years.as_str());
        }

        let mut years: Vec<String> = years.into_iter().map(str::to_string).collect();
        let numeric: Option<Vec<i64>> = years.iter().map(|y| y.trim().parse().ok()).collect();
        if let Some(keys) = numeric {
            let mut paired: Vec<(i64, String)> = keys.into_iter().zip(years).collect();
            paired.sort();
            years = paired.into_iter().map(|(_, y)| y).collect();
        }
        debug!(countries = countries.len(), years = years.len(), "pivoted");

        Self { years, countries }
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn headers(&self) -> Vec<&str> {
        std::iter::once("country")
            .chain(self.years.iter().map(String::as_str))
            .collect()
    }

    /// Rows in output order; a country with no value for a year gets an empty cell.
    pub fn rows(&self) -> Vec<Vec<&str>> {
        self.countries
            .iter()
            .map(|(country, values)| {
                std::iter::once(country.as_str())
                    .chain(
                        self.years
                            .iter()
                            .map(|y| values.get(y).map(String::as_str).unwrap_or("")),
                    )
                    .collect()
            })
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_csv_atomic(path, &self.headers(), self.rows())
    }
}
