//! Keyword frequency features over free text.

/// Occurrences at which a keyword weight saturates at 1.0.
pub const KEYWORD_SATURATION: f32 = 3.0;

/// Scanned keywords, in slot order.
pub const CLINICAL_KEYWORDS: [&str; 53] = [
    "pain",
    "severe",
    "mild",
    "moderate",
    "chronic",
    "acute",
    "onset",
    "duration",
    "frequency",
    "radiation",
    "quality",
    "associated",
    "relieved",
    "worsened",
    "improved",
    "progressive",
    "intermittent",
    "constant",
    "burning",
    "sharp",
    "dull",
    "throbbing",
    "cramping",
    "pressure",
    "tightness",
    "aching",
    "stabbing",
    "shooting",
    "tingling",
    "numbness",
    "weakness",
    "swelling",
    "inflammation",
    "infection",
    "bleeding",
    "discharge",
    "lesion",
    "mass",
    "nodule",
    "growth",
    "ulcer",
    "wound",
    "trauma",
    "injury",
    "fracture",
    "sprain",
    "strain",
    "tear",
    "dysfunction",
    "failure",
    "obstruction",
    "stenosis",
    "dilation",
];

/// Counts non-overlapping substring occurrences of each keyword.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    keywords: Vec<String>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(CLINICAL_KEYWORDS)
    }
}

impl KeywordExtractor {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn width(&self) -> usize {
        self.keywords.len()
    }

    /// Weight per keyword: `min(count / 3, 1.0)` over the lowercased text.
    ///
    /// Matching is plain substring, so "pain" also counts inside "painful".
    pub fn extract(&self, text: &str) -> Vec<f32> {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .map(|kw| {
                if kw.is_empty() {
                    return 0.0;
                }
                let count = text.matches(kw.as_str()).count() as f32;
                (count / KEYWORD_SATURATION).min(1.0)
            })
            .collect()
    }
}
