use serde::Serialize;
use std::collections::HashMap;

/// Raw status code whose translated label counts as a completed enrollment.
pub const COMPLETED_CODE: &str = "COMPLETED";

/// One row of an enrollment export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnrollmentRecord {
    pub course_name: String,
    pub status_code: String,
}

impl EnrollmentRecord {
    pub fn new(course_name: impl Into<String>, status_code: impl Into<String>) -> Self {
        Self {
            course_name: course_name.into(),
            status_code: status_code.into(),
        }
    }
}

/// Ordered, immutable lookup table from raw status codes to display labels.
///
/// Table order doubles as the column order of rendered reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusVocabulary {
    entries: Vec<(String, String)>,
}

impl StatusVocabulary {
    pub fn standard() -> Self {
        Self::from_pairs([
            (COMPLETED_CODE, "Concluído"),
            ("IN_PROGRESS", "Em Andamento"),
            ("NOT_STARTED", "Não Iniciado"),
        ])
    }

    /// Builds a vocabulary from `(code, label)` pairs. A repeated code keeps its
    /// first position and takes the last label given for it.
    pub fn from_pairs<I, C, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: Into<String>,
        L: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (code, label) in pairs {
            let code = code.into();
            let label = label.into();
            match entries.iter_mut().find(|(existing, _)| *existing == code) {
                Some(entry) => entry.1 = label,
                None => entries.push((code, label)),
            }
        }

        Self { entries }
    }

    pub fn label_for(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == code)
            .map(|(_, label)| label.as_str())
    }

    pub fn label_position(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(_, candidate)| candidate == label)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(code, label)| (code.as_str(), label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

/// Status counts observed for a single course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCounts {
    course_name: String,
    counts: HashMap<String, u64>,
}

impl CourseCounts {
    fn new(course_name: &str) -> Self {
        Self {
            course_name: course_name.to_string(),
            counts: HashMap::new(),
        }
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.counts.get(label).copied()
    }

    /// Count for `label`, treating an absent label as zero.
    pub fn count(&self, label: &str) -> u64 {
        self.get(label).unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }
}

/// Course-by-label count matrix keeping courses in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMatrix {
    labels: Vec<String>,
    courses: Vec<CourseCounts>,
    index: HashMap<String, usize>,
}

impl CountMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `course_name` without counting anything for it.
    pub(crate) fn ensure_course(&mut self, course_name: &str) -> &mut CourseCounts {
        let position = match self.index.get(course_name) {
            Some(position) => *position,
            None => {
                self.courses.push(CourseCounts::new(course_name));
                let position = self.courses.len() - 1;
                self.index.insert(course_name.to_string(), position);
                position
            }
        };

        &mut self.courses[position]
    }

    pub(crate) fn increment(&mut self, course_name: &str, label: &str) {
        self.register_label(label);
        let course = self.ensure_course(course_name);
        *course.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub(crate) fn register_label(&mut self, label: &str) {
        if !self.labels.iter().any(|known| known == label) {
            self.labels.push(label.to_string());
        }
    }

    /// Gives every course an explicit entry for every label seen anywhere in
    /// the matrix.
    pub fn densify(&mut self) {
        for course in &mut self.courses {
            for label in &self.labels {
                course.counts.entry(label.clone()).or_insert(0);
            }
        }
    }

    /// Reorders label columns: vocabulary labels in table order, then
    /// pass-through codes in first-seen order.
    pub fn order_labels(&mut self, vocabulary: &StatusVocabulary) {
        self.labels
            .sort_by_key(|label| vocabulary.label_position(label).unwrap_or(usize::MAX));
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn courses(&self) -> &[CourseCounts] {
        &self.courses
    }

    pub fn get(&self, course_name: &str) -> Option<&CourseCounts> {
        self.index
            .get(course_name)
            .map(|position| &self.courses[*position])
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
