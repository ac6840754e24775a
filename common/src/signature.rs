use std::collections::BTreeSet;

/// A known-service pattern: a label and the keywords that identify it.
///
/// Keywords are stored lowercased so matching only has to lowercase the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRule {
    label: String,
    keywords: BTreeSet<String>,
}

impl SignatureRule {
    pub fn new<I, S>(label: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            label: label.into(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// A rule whose only keyword is its own label.
    pub fn keyword(label: &str) -> Self {
        Self::new(label, [label])
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// `lowered` must already be lowercase.
    pub fn matches_lowered(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}
