//! Layered heuristic that decides whether a page looks like an account portal.
//!
//! This is a structural scan over the raw markup, not an HTML parser: anchors,
//! buttons and form openings are located with regular expressions and their
//! contents searched for the configured keywords.

use crate::config::ProbeConfig;
use crate::error::Result;
use crate::result::{Classification, DetectionMethod};
use regex::Regex;

const ELEMENT_PATTERN: &str = r"(?is)<a\b([^>]*)>(.*?)</a\s*>|<button\b[^>]*>(.*?)</button\s*>";
const HREF_PATTERN: &str = r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#;

#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: Vec<String>,
    form_re: Regex,
    element_re: Regex,
    href_re: Regex,
}

impl Classifier {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        Ok(Self {
            keywords: config
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .collect(),
            form_re: Regex::new(&config.form_pattern)?,
            element_re: Regex::new(ELEMENT_PATTERN)?,
            href_re: Regex::new(HREF_PATTERN)?,
        })
    }

    pub fn classify(&self, body: &str) -> Classification {
        Classification {
            keyword_hit: self.find_keyword(body).map(String::from),
            link_hit: self.contains_portal_link(body),
            has_form: self.contains_form(body),
        }
    }

    /// First configured keyword contained in `text`, case-insensitively.
    pub fn find_keyword(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn contains_form(&self, body: &str) -> bool {
        self.form_re.is_match(body)
    }

    /// True if an anchor's text or href, or a button's text, carries a keyword.
    pub fn contains_portal_link(&self, body: &str) -> bool {
        for caps in self.element_re.captures_iter(body) {
            if let Some(attrs) = caps.get(1)
                && let Some(href) = self.extract_href(attrs.as_str())
                && self.find_keyword(href).is_some()
            {
                return true;
            }

            let text = caps.get(2).or_else(|| caps.get(3));
            if let Some(text) = text
                && self.find_keyword(text.as_str()).is_some()
            {
                return true;
            }
        }
        false
    }

    fn extract_href<'a>(&self, attrs: &'a str) -> Option<&'a str> {
        let caps = self.href_re.captures(attrs)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
    }
}

/// Apply the match rules in precedence order: keyword plus form first, then
/// link plus form.
pub fn match_rule(classification: &Classification) -> Option<DetectionMethod> {
    if !classification.has_form {
        return None;
    }
    if classification.keyword_hit.is_some() {
        Some(DetectionMethod::KeywordWithForm)
    } else if classification.link_hit {
        Some(DetectionMethod::LinkWithForm)
    } else {
        None
    }
}
