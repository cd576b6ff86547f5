use super::domain::{StatusVocabulary, COMPLETED_CODE};

/// Outcome of looking a raw status code up in the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation<'a> {
    /// The code is in the vocabulary and maps to this label.
    Labelled(&'a str),
    /// The code is unknown and becomes its own column, unchanged.
    PassThrough(&'a str),
}

impl<'a> Translation<'a> {
    pub const fn as_str(self) -> &'a str {
        match self {
            Self::Labelled(label) | Self::PassThrough(label) => label,
        }
    }

    pub const fn is_pass_through(self) -> bool {
        matches!(self, Self::PassThrough(_))
    }
}

/// Maps raw status codes to display labels using a fixed vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTranslator {
    vocabulary: StatusVocabulary,
}

impl StatusTranslator {
    pub fn new(vocabulary: StatusVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn classify<'a>(&'a self, raw_code: &'a str) -> Translation<'a> {
        match self.vocabulary.label_for(raw_code) {
            Some(label) => Translation::Labelled(label),
            None => Translation::PassThrough(raw_code),
        }
    }

    pub fn translate<'a>(&'a self, raw_code: &'a str) -> &'a str {
        self.classify(raw_code).as_str()
    }

    /// Label counted as completion when computing adherence.
    pub fn completed_label(&self) -> &str {
        self.translate(COMPLETED_CODE)
    }

    pub fn vocabulary(&self) -> &StatusVocabulary {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_are_labelled() {
        let translator = StatusTranslator::default();
        assert_eq!(translator.translate("COMPLETED"), "Concluído");
        assert_eq!(translator.translate("IN_PROGRESS"), "Em Andamento");
        assert_eq!(
            translator.classify("NOT_STARTED"),
            Translation::Labelled("Não Iniciado")
        );
    }

    #[test]
    fn unknown_codes_pass_through_unchanged() {
        let translator = StatusTranslator::default();
        for raw in ["WITHDRAWN", "completed", "", " COMPLETED", "Concluído"] {
            let translation = translator.classify(raw);
            assert!(translation.is_pass_through(), "{raw:?} should pass through");
            assert_eq!(translation.as_str(), raw);
        }
    }

    #[test]
    fn completed_label_follows_the_vocabulary() {
        let translator = StatusTranslator::new(StatusVocabulary::from_pairs([
            ("COMPLETED", "Done"),
            ("IN_PROGRESS", "Started"),
        ]));
        assert_eq!(translator.completed_label(), "Done");

        let without_completion =
            StatusTranslator::new(StatusVocabulary::from_pairs([("IN_PROGRESS", "Started")]));
        assert_eq!(without_completion.completed_label(), "COMPLETED");
    }
}
