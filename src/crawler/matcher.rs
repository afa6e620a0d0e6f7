use regex::{Regex, RegexBuilder};

/// Strategy used to test extracted page text
///
/// Chosen once when the crawl target is built; every page is then tested
/// with the same compiled matcher.
#[derive(Debug, Clone)]
pub enum PhraseMatcher {
    /// Case-insensitive substring containment; holds the lowercased phrase
    Plain(String),

    /// Case-insensitive regular expression search
    Regex(Regex),
}

impl PhraseMatcher {
    /// Builds a matcher from a phrase and the regex flag
    ///
    /// # Returns
    ///
    /// * `Ok(PhraseMatcher)` - Matcher ready to use
    /// * `Err(regex::Error)` - `is_regex` was set and the pattern does not compile
    ///
    /// # Examples
    ///
    /// ```
    /// use tracebound::crawler::PhraseMatcher;
    ///
    /// let plain = PhraseMatcher::new("Proof", false).unwrap();
    /// assert!(plain.matches("a proof of work"));
    ///
    /// let pattern = PhraseMatcher::new("pro[o0]f", true).unwrap();
    /// assert!(pattern.matches("PRO0F"));
    /// assert!(!pattern.matches("pr00f"));
    /// ```
    pub fn new(phrase: &str, is_regex: bool) -> Result<Self, regex::Error> {
        if is_regex {
            Self::regex(phrase)
        } else {
            Ok(Self::plain(phrase))
        }
    }

    pub fn plain(phrase: &str) -> Self {
        PhraseMatcher::Plain(phrase.to_lowercase())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(PhraseMatcher::Regex(regex))
    }

    /// Tests `text` for the phrase anywhere within it
    pub fn matches(&self, text: &str) -> bool {
        match self {
            PhraseMatcher::Plain(needle) => text.to_lowercase().contains(needle.as_str()),
            PhraseMatcher::Regex(regex) => regex.is_match(text),
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, PhraseMatcher::Regex(_))
    }
}
