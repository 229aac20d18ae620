use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;

use super::record::{Modification, Record};
use crate::graph::{DistanceBasis, Property, ValuePair};

const EXPECTED_COLUMNS: [&str; 19] = [
    "Article",
    "Polymer matrix name",
    "Polymer matrix elastic modulus (GPa)",
    "Nanocomposite Elastic Modulus (GPa)",
    "Elastic Modulus improvement (%)",
    "Polymer matrix elastic modulus Log10",
    "Elastic modulus improvement Log10",
    "Polymer matrix Strength (MPa)",
    "Strength improvement (%)",
    "Polymer matrix strength Log10",
    "Strength improvement Log10",
    "Polymer matrix strain to failure",
    "Strain to failure improvement%",
    "Polymer matrix strain to failure Log10",
    "Strain to failure improvement Log10",
    "MMT weight%",
    "Modification (modified/unmodified)",
    "Dispersion(microcomposite/exfoliated/intercalated/agglomerated)",
    "Thermoset? Thermoplastic? Elastomer?",
];

/// The measurement table, loaded once per run and shared by every analysis.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open dataset {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("failed to parse dataset {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader
            .headers()
            .context("dataset has no header row")?
            .clone();
        let columns = Columns::from_headers(&headers);

        for name in EXPECTED_COLUMNS {
            if !columns.contains(name) {
                warn!("column {name:?} not found in dataset");
            }
        }

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row.context("failed to read dataset row")?;
            records.push(parse_record(&columns, &row));
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Rows complete for the given property and distance basis, in table
    /// order. Incomplete rows are excluded entirely.
    pub fn value_pairs(&self, property: Property, basis: DistanceBasis) -> Vec<ValuePair> {
        self.records
            .iter()
            .filter_map(|record| record.value_pair(property, basis))
            .collect()
    }
}

struct Columns {
    by_name: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let by_name = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim().to_string(), index))
            .collect();
        Self { by_name }
    }

    fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    fn cell<'a>(&self, row: &'a csv::StringRecord, name: &str) -> Option<&'a str> {
        self.by_name.get(name).and_then(|&index| row.get(index))
    }

    fn numeric(&self, row: &csv::StringRecord, name: &str) -> Option<f64> {
        coerce_numeric(self.cell(row, name)?)
    }

    fn text(&self, row: &csv::StringRecord, name: &str) -> Option<String> {
        coerce_text(self.cell(row, name)?)
    }
}

fn parse_record(columns: &Columns, row: &csv::StringRecord) -> Record {
    Record {
        article: columns.text(row, "Article"),
        polymer: columns.text(row, "Polymer matrix name"),
        matrix_modulus: columns.numeric(row, "Polymer matrix elastic modulus (GPa)"),
        composite_modulus: columns.numeric(row, "Nanocomposite Elastic Modulus (GPa)"),
        modulus_improvement: columns.numeric(row, "Elastic Modulus improvement (%)"),
        matrix_modulus_log10: columns.numeric(row, "Polymer matrix elastic modulus Log10"),
        modulus_improvement_log10: columns.numeric(row, "Elastic modulus improvement Log10"),
        matrix_strength: columns.numeric(row, "Polymer matrix Strength (MPa)"),
        strength_improvement: columns.numeric(row, "Strength improvement (%)"),
        matrix_strength_log10: columns.numeric(row, "Polymer matrix strength Log10"),
        strength_improvement_log10: columns.numeric(row, "Strength improvement Log10"),
        matrix_strain: columns.numeric(row, "Polymer matrix strain to failure"),
        strain_improvement: columns.numeric(row, "Strain to failure improvement%"),
        matrix_strain_log10: columns.numeric(row, "Polymer matrix strain to failure Log10"),
        strain_improvement_log10: columns.numeric(row, "Strain to failure improvement Log10"),
        mmt_weight: columns.numeric(row, "MMT weight%"),
        modification: columns
            .text(row, "Modification (modified/unmodified)")
            .and_then(|value| parse_modification(&value)),
        dispersion: columns
            .text(row, "Dispersion(microcomposite/exfoliated/intercalated/agglomerated)")
            .map(|value| value.to_lowercase()),
        polymer_class: columns.text(row, "Thermoset? Thermoplastic? Elastomer?"),
    }
}

/// Numeric coercion with the same tolerance as the source spreadsheet:
/// "?", "nan" and blanks are missing, anything else must parse as a float.
fn coerce_numeric(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "?" || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    trimmed.parse().ok()
}

fn coerce_text(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "?" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_modification(value: &str) -> Option<Modification> {
    match value.trim().to_lowercase().as_str() {
        "modified" => Some(Modification::Modified),
        "unmodified" => Some(Modification::Unmodified),
        _ => None,
    }
}
