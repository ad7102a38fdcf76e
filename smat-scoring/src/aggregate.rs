//! Per-dimension score aggregation

use crate::dimensions::Dimension;
use crate::reference::Question;
use crate::round2;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Submitted answers: question id → response level (1-5)
///
/// The aggregator trusts the levels; range checks belong to the caller.
pub type Answers = HashMap<String, u8>;

/// Average score per dimension, in the order dimensions first appear in the
/// question list
///
/// Only dimensions with at least one answered question are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionAverages {
    entries: Vec<(Dimension, f64)>,
}

impl DimensionAverages {
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        self.entries
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, score)| *score)
    }

    pub fn contains(&self, dimension: Dimension) -> bool {
        self.get(dimension).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean of the dimension averages, rounded to two decimals
    ///
    /// `None` when no dimension has been scored.
    pub fn overall(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let sum: f64 = self.entries.iter().map(|(_, s)| s).sum();
        Some(round2(sum / self.entries.len() as f64))
    }
}

impl FromIterator<(Dimension, f64)> for DimensionAverages {
    /// Later duplicates of a dimension are ignored
    fn from_iter<I: IntoIterator<Item = (Dimension, f64)>>(iter: I) -> Self {
        let mut averages = DimensionAverages::default();
        for (dimension, score) in iter {
            if !averages.contains(dimension) {
                averages.entries.push((dimension, score));
            }
        }
        averages
    }
}

impl Serialize for DimensionAverages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (dimension, score) in &self.entries {
            map.serialize_entry(dimension.name(), score)?;
        }
        map.end()
    }
}

/// Average the answered levels of each dimension
///
/// Answers for question ids not in `questions` are ignored. Averages are
/// rounded to two decimals with ties to even.
pub fn calculate_dimension_averages(questions: &[Question], answers: &Answers) -> DimensionAverages {
    // (dimension, sum, count) in first-seen order
    let mut totals: Vec<(Dimension, u32, u32)> = Vec::new();

    for question in questions {
        let Some(&level) = answers.get(&question.id) else {
            continue;
        };
        match totals.iter_mut().find(|(d, _, _)| *d == question.dimension) {
            Some((_, sum, count)) => {
                *sum += u32::from(level);
                *count += 1;
            }
            None => totals.push((question.dimension, u32::from(level), 1)),
        }
    }

    totals
        .into_iter()
        .filter(|(_, _, count)| *count > 0)
        .map(|(dimension, sum, count)| (dimension, round2(f64::from(sum) / f64::from(count))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, dimension: Dimension) -> Question {
        Question {
            id: id.to_string(),
            dimension,
            dimension_name: dimension.name().to_string(),
            element: "Element".to_string(),
            text: format!("Question {}", id),
        }
    }

    fn sample_questions() -> Vec<Question> {
        vec![
            question("Q01", Dimension::Organization),
            question("Q02", Dimension::MetricsReporting),
            question("Q03", Dimension::Organization),
            question("Q04", Dimension::MetricsReporting),
            question("Q05", Dimension::MetricsReporting),
            question("Q06", Dimension::ManagingChange),
        ]
    }

    fn answers(pairs: &[(&str, u8)]) -> Answers {
        pairs.iter().map(|(id, l)| (id.to_string(), *l)).collect()
    }

    #[test]
    fn test_end_to_end_averages() {
        let averages = calculate_dimension_averages(
            &sample_questions(),
            &answers(&[("Q01", 2), ("Q03", 3), ("Q02", 5), ("Q04", 5), ("Q05", 4)]),
        );
        assert_eq!(averages.get(Dimension::Organization), Some(2.5));
        assert_eq!(averages.get(Dimension::MetricsReporting), Some(4.67));
    }

    #[test]
    fn test_unanswered_dimension_absent() {
        let averages = calculate_dimension_averages(&sample_questions(), &answers(&[("Q01", 4)]));
        assert_eq!(averages.len(), 1);
        assert!(!averages.contains(Dimension::ManagingChange));
        assert!(!averages.contains(Dimension::MetricsReporting));
    }

    #[test]
    fn test_no_answers_yields_empty_without_dividing() {
        let averages = calculate_dimension_averages(&sample_questions(), &Answers::new());
        assert!(averages.is_empty());
        assert_eq!(averages.overall(), None);
    }

    #[test]
    fn test_unknown_question_ids_ignored() {
        let averages =
            calculate_dimension_averages(&sample_questions(), &answers(&[("Q99", 5), ("Q06", 1)]));
        assert_eq!(averages.len(), 1);
        assert_eq!(averages.get(Dimension::ManagingChange), Some(1.0));
    }

    #[test]
    fn test_order_follows_question_list() {
        let averages = calculate_dimension_averages(
            &sample_questions(),
            &answers(&[("Q06", 3), ("Q02", 3), ("Q01", 3)]),
        );
        let order: Vec<Dimension> = averages.iter().map(|(d, _)| d).collect();
        assert_eq!(
            order,
            vec![Dimension::Organization, Dimension::MetricsReporting, Dimension::ManagingChange]
        );
    }

    #[test]
    fn test_uniform_levels_stay_in_range() {
        let questions = sample_questions();
        for level in 1..=5u8 {
            let all: Answers = questions.iter().map(|q| (q.id.clone(), level)).collect();
            let averages = calculate_dimension_averages(&questions, &all);
            for (_, score) in averages.iter() {
                assert!((1.0..=5.0).contains(&score));
                assert_eq!(score, f64::from(level));
            }
        }
    }

    #[test]
    fn test_overall_rounds_mean_of_dimensions() {
        let averages: DimensionAverages = vec![
            (Dimension::Organization, 2.5),
            (Dimension::MetricsReporting, 4.67),
            (Dimension::ManagingChange, 3.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(averages.overall(), Some(3.39));
    }

    #[test]
    fn test_serializes_as_named_map() {
        let averages: DimensionAverages = vec![(Dimension::DataSystems, 3.0)].into_iter().collect();
        let json = serde_json::to_value(&averages).unwrap();
        assert_eq!(json["Data & Systems"], 3.0);
    }
}
