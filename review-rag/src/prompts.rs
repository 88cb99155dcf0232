//! Answer modes and their prompt templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReviewRagError;

/// The answer style requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Direct question answering.
    Qa,
    /// A deduplicated, FAQ-style answer.
    Faq,
    /// A strengths/weaknesses digest.
    Summarize,
}

impl Mode {
    /// Every supported mode, in display order.
    pub const ALL: [Mode; 3] = [Mode::Qa, Mode::Faq, Mode::Summarize];

    /// The wire name (`qa`, `faq`, `summarize`).
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Qa => "qa",
            Mode::Faq => "faq",
            Mode::Summarize => "summarize",
        }
    }

    /// A human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Qa => "Q&A",
            Mode::Faq => "FAQ",
            Mode::Summarize => "Summarize",
        }
    }

    /// The prompt template for this mode.
    pub fn template(self) -> PromptTemplate {
        match self {
            Mode::Qa => PromptTemplate::new(REVIEW_QA_PROMPT),
            Mode::Faq => PromptTemplate::new(FAQ_PROMPT),
            Mode::Summarize => PromptTemplate::new(SUMMARIZE_PROMPT),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ReviewRagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL.into_iter().find(|mode| mode.as_str() == s).ok_or_else(|| {
            ReviewRagError::UnknownMode {
                mode: s.to_string(),
                valid: Mode::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            }
        })
    }
}

/// A prompt with `{context}` and `{question}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    template: &'static str,
}

impl PromptTemplate {
    /// Wrap a template string.
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// The raw template text.
    pub fn as_str(&self) -> &'static str {
        self.template
    }

    /// Substitute the placeholders in a single pass; braces inside the
    /// substituted context or question are left as they are.
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{context}") {
                out.push_str(context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{question}") {
                out.push_str(question);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

const REVIEW_QA_PROMPT: &str = "\
You are an assistant that answers questions about a product based on real customer reviews.

Use only the information in the reviews below to answer the question. If the reviews do not contain enough information to answer confidently, say so clearly.

Customer reviews:
{context}

Question: {question}

Answer:";

const FAQ_PROMPT: &str = "\
You are an assistant that writes clear, concise answers to FAQ questions, based on what real customers said about a product.

Use only the information in the reviews below. Group similar points together and avoid repetition.

Customer reviews:
{context}

FAQ question: {question}

Answer:";

const SUMMARIZE_PROMPT: &str = "\
You are an assistant that summarizes customer reviews of a product.

Based on the reviews below, provide:
1. A short overall summary (2-3 sentences)
2. The main strengths mentioned by customers
3. The main weaknesses or complaints mentioned by customers

Customer reviews:
{context}

Focus: {question}

Summary:";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!("qa".parse::<Mode>().unwrap(), Mode::Qa);
        assert_eq!("faq".parse::<Mode>().unwrap(), Mode::Faq);
        assert_eq!("summarize".parse::<Mode>().unwrap(), Mode::Summarize);
    }

    #[test]
    fn rejects_unknown_mode_with_valid_list() {
        let err = "bogus".parse::<Mode>().unwrap_err();
        match &err {
            ReviewRagError::UnknownMode { mode, valid } => {
                assert_eq!(mode, "bogus");
                assert_eq!(valid, &["qa", "faq", "summarize"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!("QA".parse::<Mode>().is_err());
    }

    #[test]
    fn every_template_has_both_placeholders() {
        for mode in Mode::ALL {
            let template = mode.template();
            assert!(template.as_str().contains("{context}"), "{mode}");
            assert!(template.as_str().contains("{question}"), "{mode}");
        }
    }

    #[test]
    fn render_fills_placeholders() {
        let prompt = Mode::Qa.template().render("[Review 1 - Rating 5/5]\nGreat.", "Is it good?");
        assert!(prompt.contains("[Review 1 - Rating 5/5]\nGreat."));
        assert!(prompt.contains("Question: Is it good?"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{question}"));
    }

    #[test]
    fn placeholders_inside_reviews_are_not_expanded() {
        let prompt = Mode::Faq.template().render("someone typed {question} here", "Loud?");
        assert!(prompt.contains("someone typed {question} here"));
        assert!(prompt.contains("FAQ question: Loud?"));
    }
}
