//! Keyword-recall evaluation over a small labelled question set.
//!
//! Each case pairs a question with keywords a good answer should mention.
//! The score of one answer is the fraction of its keywords found in it,
//! case-insensitively; the report averages that over all cases.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::prompts::Mode;
use crate::service::ReviewRagService;

/// A labelled evaluation question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalCase {
    /// The question to ask.
    pub question: String,
    /// Terms a relevant answer is expected to contain.
    pub expected_keywords: Vec<String>,
}

impl EvalCase {
    /// Create a case from a question and its keywords.
    pub fn new<I, S>(question: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question: question.into(),
            expected_keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// The built-in evaluation set: beginners, durability, noise and cleaning.
pub fn default_eval_set() -> Vec<EvalCase> {
    vec![
        EvalCase::new(
            "Is this product suitable for beginners?",
            ["beginner", "easy", "simple", "intuitive"],
        ),
        EvalCase::new("How durable is this product?", ["durable", "years", "still works", "solid"]),
        EvalCase::new("Is the product noisy?", ["noisy", "noise", "loud", "quiet"]),
        EvalCase::new("How easy is it to clean?", ["clean", "dishwasher", "easy to clean"]),
    ]
}

/// The keywords found in `answer` (in the order given) and the fraction found.
///
/// An empty keyword list scores 0.
pub fn keyword_recall(answer: &str, keywords: &[String]) -> (Vec<String>, f64) {
    let answer = answer.to_lowercase();
    let hits: Vec<String> =
        keywords.iter().filter(|k| answer.contains(&k.to_lowercase())).cloned().collect();
    let score = if keywords.is_empty() { 0.0 } else { hits.len() as f64 / keywords.len() as f64 };
    (hits, score)
}

/// The outcome of one evaluation question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalResult {
    pub question: String,
    pub answer: String,
    pub retrieved_count: usize,
    pub keyword_hits: Vec<String>,
    pub keyword_score: f64,
}

/// All results plus the mean keyword recall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalReport {
    pub results: Vec<EvalResult>,
    pub average_keyword_recall: f64,
}

/// Ask every case in `qa` mode against an already indexed service.
///
/// Stops at the first failing question.
pub async fn run_evaluation(service: &ReviewRagService, cases: &[EvalCase]) -> Result<EvalReport> {
    let mut results = Vec::with_capacity(cases.len());

    for case in cases {
        let output = service.ask(&case.question, Mode::Qa, None).await?;
        let (keyword_hits, keyword_score) = keyword_recall(&output.answer, &case.expected_keywords);
        info!(
            question = %case.question,
            keyword_score,
            retrieved = output.sources.len(),
            "evaluated question"
        );
        results.push(EvalResult {
            question: case.question.clone(),
            answer: output.answer,
            retrieved_count: output.sources.len(),
            keyword_hits,
            keyword_score,
        });
    }

    let average_keyword_recall = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.keyword_score).sum::<f64>() / results.len() as f64
    };
    info!(cases = results.len(), average_keyword_recall, "evaluation finished");

    Ok(EvalReport { results, average_keyword_recall })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn recall_is_case_insensitive() {
        let (hits, score) =
            keyword_recall("Very EASY to use and Intuitive.", &keywords(&["easy", "intuitive", "beginner", "simple"]));
        assert_eq!(hits, vec!["easy", "intuitive"]);
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn multi_word_keywords_match_as_phrases() {
        let (hits, _) = keyword_recall("It still works after years.", &keywords(&["still works", "solid"]));
        assert_eq!(hits, vec!["still works"]);
    }

    #[test]
    fn empty_keywords_score_zero() {
        assert_eq!(keyword_recall("anything", &[]), (Vec::new(), 0.0));
    }

    #[test]
    fn default_set_covers_four_topics() {
        let cases = default_eval_set();
        assert_eq!(cases.len(), 4);
        assert!(cases.iter().all(|c| !c.expected_keywords.is_empty()));
        assert_eq!(cases[3].expected_keywords, keywords(&["clean", "dishwasher", "easy to clean"]));
    }
}
