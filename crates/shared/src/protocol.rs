use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub k: u32,
}

/// One cited snippet as the answer service sends it. The backend attaches
/// further metadata (document name, page); only `content` is part of the
/// contract and everything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePayload {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourcePayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_documents: u64,
    pub database: String,
}
