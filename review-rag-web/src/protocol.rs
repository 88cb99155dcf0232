use review_rag::{Document, Mode};
use serde::{Deserialize, Serialize};

fn default_mode() -> String {
    Mode::Qa.as_str().to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    /// `0` and absent both mean "no filter".
    #[serde(default)]
    pub min_rating: Option<f64>,
}

impl AskRequest {
    pub fn rating_filter(&self) -> Option<f64> {
        self.min_rating.filter(|rating| *rating > 0.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub mode: Mode,
    pub sources: Vec<Document>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub source: String,
    pub reviews: usize,
    pub chunks: usize,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub chunks: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
