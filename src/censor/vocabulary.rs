use std::collections::{BTreeMap, HashSet};

// The built-in word lists are not exhaustive; deployments extend them with
// `censor.extra_words` in the configuration file.

const PROFANITY_EN: &[&str] = &[
    "fuck", "fucked", "fucking", "shit", "piss", "cunt", "cocksucker", "motherfucker",
    "tits", "bitch", "asshole", "bastard", "dick", "pussy", "nigger", "nigga",
];

const POLICY_EN: &[&str] = &[
    "kill", "die", "murder", "suicide", "bomb", "terrorist", "nazi",
    "sex", "porn", "naked", "gun", "drugs",
];

const PROFANITY_VI: &[&str] = &[
    "địt", "đụ", "lồn", "cặc", "buồi", "đĩ", "chó đẻ", "đốn mạt", "ngu",
    "cứt", "đái",
];

const POLICY_VI: &[&str] = &[
    "giết", "chết", "tự tử", "khủng bố", "bom", "súng", "ma túy", "quan hệ",
];

/// Denylisted words per locale
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    locales: BTreeMap<String, Vec<String>>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// English and Vietnamese lists, each general profanity followed by policy-sensitive terms
    pub fn builtin() -> Self {
        let mut vocabulary = Self::new();
        vocabulary.insert("en", PROFANITY_EN.iter().chain(POLICY_EN));
        vocabulary.insert("vi", PROFANITY_VI.iter().chain(POLICY_VI));
        vocabulary
    }

    pub fn insert<I, S>(&mut self, locale: &str, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.locales
            .entry(locale.to_lowercase())
            .or_default()
            .extend(words.into_iter().map(|w| w.as_ref().to_string()));
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    /// Union of the selected locales' words, first occurrence order, duplicates removed
    pub fn denylist<S: AsRef<str>>(&self, locales: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut words = Vec::new();

        for locale in locales {
            let Some(list) = self.locales.get(&locale.as_ref().to_lowercase()) else {
                continue;
            };
            for word in list {
                let word = word.trim();
                if !word.is_empty() && seen.insert(word.to_lowercase()) {
                    words.push(word.to_string());
                }
            }
        }

        words
    }
}
