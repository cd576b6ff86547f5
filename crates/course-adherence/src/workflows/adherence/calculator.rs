use super::domain::CountMatrix;
use super::translator::StatusTranslator;
use std::collections::HashMap;

/// Completion percentage per course, keyed by course name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdherenceByCourse {
    values: HashMap<String, f64>,
}

impl AdherenceByCourse {
    pub fn get(&self, course_name: &str) -> Option<f64> {
        self.values.get(course_name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn insert(&mut self, course_name: &str, pct: f64) {
        self.values.insert(course_name.to_string(), pct);
    }
}

/// Share of each course's enrollments carrying the completed label, as a
/// percentage rounded to two decimals. A course without enrollments scores 0.
pub fn compute_adherence(translator: &StatusTranslator, matrix: &CountMatrix) -> AdherenceByCourse {
    let completed_label = translator.completed_label();
    let mut adherence = AdherenceByCourse::default();

    for course in matrix.courses() {
        let total = course.total();
        let pct = if total == 0 {
            0.0
        } else {
            round_percentage(100.0 * course.count(completed_label) as f64 / total as f64)
        };
        adherence.insert(course.course_name(), pct);
    }

    adherence
}

/// Rounds to two decimals, halves away from zero.
pub fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
