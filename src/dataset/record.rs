use crate::graph::{DistanceBasis, Property, ValuePair};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modification {
    Modified,
    Unmodified,
}

impl Modification {
    pub fn label(self) -> &'static str {
        match self {
            Self::Modified => "modified",
            Self::Unmodified => "unmodified",
        }
    }

    pub fn center_label(self) -> &'static str {
        match self {
            Self::Modified => "MODIFIED",
            Self::Unmodified => "UNMODIFIED",
        }
    }
}

/// One spreadsheet row after numeric coercion. Unparseable or missing cells
/// become `None`; analyses drop whole rows that lack a field they need.
#[derive(Clone, Debug, Default)]
pub struct Record {
    pub article: Option<String>,
    pub polymer: Option<String>,
    pub matrix_modulus: Option<f64>,
    pub composite_modulus: Option<f64>,
    pub modulus_improvement: Option<f64>,
    pub matrix_modulus_log10: Option<f64>,
    pub modulus_improvement_log10: Option<f64>,
    pub matrix_strength: Option<f64>,
    pub strength_improvement: Option<f64>,
    pub matrix_strength_log10: Option<f64>,
    pub strength_improvement_log10: Option<f64>,
    pub matrix_strain: Option<f64>,
    pub strain_improvement: Option<f64>,
    pub matrix_strain_log10: Option<f64>,
    pub strain_improvement_log10: Option<f64>,
    pub mmt_weight: Option<f64>,
    pub modification: Option<Modification>,
    pub dispersion: Option<String>,
    pub polymer_class: Option<String>,
}

impl Record {
    /// Extracts the value pair for `property`, or `None` when the row is
    /// incomplete for the requested distance basis. A row is either used
    /// whole or not at all.
    pub fn value_pair(&self, property: Property, basis: DistanceBasis) -> Option<ValuePair> {
        let (primary, improvement, primary_log10, improvement_log10) = match property {
            Property::Modulus => (
                self.matrix_modulus,
                self.modulus_improvement,
                self.matrix_modulus_log10,
                self.modulus_improvement_log10,
            ),
            Property::Strength => (
                self.matrix_strength,
                self.strength_improvement,
                self.matrix_strength_log10,
                self.strength_improvement_log10,
            ),
            Property::Strain => (
                self.matrix_strain,
                self.strain_improvement,
                self.matrix_strain_log10,
                self.strain_improvement_log10,
            ),
        };

        let primary = primary?;
        let improvement = improvement?;

        if matches!(basis, DistanceBasis::Log10)
            && (primary_log10.is_none() || improvement_log10.is_none())
        {
            return None;
        }

        Some(ValuePair {
            primary,
            improvement,
            primary_log10,
            improvement_log10,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_record() -> Record {
        Record {
            matrix_modulus: Some(2.0),
            modulus_improvement: Some(50.0),
            matrix_modulus_log10: Some(0.301),
            modulus_improvement_log10: Some(1.699),
            ..Record::default()
        }
    }

    #[test]
    fn value_pair_requires_both_values() {
        let mut record = complete_record();
        record.modulus_improvement = None;
        assert!(record
            .value_pair(Property::Modulus, DistanceBasis::Raw)
            .is_none());
    }

    #[test]
    fn log10_basis_requires_both_transforms() {
        let mut record = complete_record();
        record.modulus_improvement_log10 = None;
        assert!(record
            .value_pair(Property::Modulus, DistanceBasis::Raw)
            .is_some());
        assert!(record
            .value_pair(Property::Modulus, DistanceBasis::Log10)
            .is_none());
    }

    #[test]
    fn complete_row_yields_pair() {
        let pair = complete_record()
            .value_pair(Property::Modulus, DistanceBasis::Log10)
            .expect("complete row");
        assert_eq!(pair.primary, 2.0);
        assert_eq!(pair.improvement, 50.0);
        assert_eq!(pair.primary_log10, Some(0.301));
    }
}
