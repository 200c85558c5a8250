//! Typed summary handed to an external narrative generator, and the shape
//! of what it returns.
//!
//! The generator (a hosted text-generation service) is not part of this
//! crate; `InsightGenerator` is the seam it plugs into. Its failures are
//! `InsightError`, separate from capture parse errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CaptureResult, Endpoint, Protocol};

/// Bumped whenever a field of `InsightContext` changes meaning or shape.
pub const INSIGHT_SCHEMA_VERSION: u32 = 1;
/// Leading packets included in the context.
pub const RECENT_PACKET_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightContext {
    pub schema_version: u32,
    pub total_packets: u64,
    pub anomalies_count: u64,
    /// Percentage with two decimals, e.g. `"12.50"`.
    pub anomaly_rate: String,
    pub protocols_used: u64,
    pub active_connections: u64,
    pub protocol_distribution: Vec<ProtocolShare>,
    pub recent_packets: Vec<RecentPacket>,
    pub traffic_trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolShare {
    pub protocol: Protocol,
    pub count: u64,
    /// Percentage with one decimal.
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPacket {
    pub protocol: Protocol,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub is_anomaly: bool,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub time: String,
    pub packets: u64,
}

impl InsightContext {
    pub fn from_result(result: &CaptureResult) -> Self {
        let stats = result.stats;
        let total = stats.total_packets;
        Self {
            schema_version: INSIGHT_SCHEMA_VERSION,
            total_packets: total,
            anomalies_count: stats.anomalies,
            anomaly_rate: percentage(stats.anomalies, total, 2),
            protocols_used: stats.protocols,
            active_connections: stats.active_connections,
            protocol_distribution: result
                .protocol_data
                .iter()
                .map(|bucket| ProtocolShare {
                    protocol: bucket.name,
                    count: bucket.count,
                    percentage: percentage(bucket.count, total, 1),
                })
                .collect(),
            recent_packets: result
                .packets
                .iter()
                .take(RECENT_PACKET_LIMIT)
                .map(|packet| RecentPacket {
                    protocol: packet.protocol,
                    source: packet.source,
                    destination: packet.destination,
                    is_anomaly: packet.is_anomaly,
                    info: packet.info.clone(),
                })
                .collect(),
            traffic_trend: result
                .timeline_data
                .iter()
                .map(|bucket| TrendPoint {
                    time: bucket.time.clone(),
                    packets: bucket.packets,
                })
                .collect(),
        }
    }
}

fn percentage(part: u64, total: u64, decimals: usize) -> String {
    let value = if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    };
    format!("{value:.decimals$}")
}

/// Commentary returned by the narrative generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InsightReport {
    pub summary: String,
    pub traffic_patterns: Vec<String>,
    pub protocol_analysis: Vec<String>,
    pub anomaly_assessment: Vec<String>,
    pub security_concerns: Vec<String>,
    pub recommendations: Vec<String>,
    pub performance_metrics: Vec<String>,
}

impl InsightReport {
    /// Parse generator output, tolerating a surrounding Markdown code fence.
    ///
    /// # Errors
    /// `MalformedResponse` when the text is not a JSON object of this shape.
    pub fn from_json(text: &str) -> Result<Self, InsightError> {
        let body = strip_code_fence(text);
        serde_json::from_str(body).map_err(|err| InsightError::MalformedResponse(err.to_string()))
    }
}

fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    body = body
        .strip_prefix("```json")
        .or_else(|| body.strip_prefix("```"))
        .unwrap_or(body);
    body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsightError {
    #[error("insight service failed: {message}")]
    Service { message: String },
    #[error("insight response is not valid JSON: {0}")]
    MalformedResponse(String),
}

impl InsightError {
    /// Both failures are transient from the caller's point of view.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InsightError::Service { .. } | InsightError::MalformedResponse(_)
        )
    }
}

/// External text-generation backend.
pub trait InsightGenerator {
    /// Return the raw response text for `context`.
    fn generate(&self, context: &InsightContext) -> Result<String, InsightError>;
}

/// Build the context for `result`, ask `generator`, and parse its answer.
pub fn narrate<G: InsightGenerator>(
    generator: &G,
    result: &CaptureResult,
) -> Result<InsightReport, InsightError> {
    let context = InsightContext::from_result(result);
    let text = generator.generate(&context)?;
    InsightReport::from_json(&text)
}
