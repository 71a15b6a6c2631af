//! Delivery outcomes and their aggregation into a dispatch result.
//!
//! Pure data: no I/O happens here. The dispatcher feeds one
//! [`DeliveryOutcome`] per selected adapter, in request order, and the
//! aggregate renders a summary plus a per-platform breakdown.

use serde::{Deserialize, Serialize};

use crate::notification::Platform;

/// The success/failure record of one delivery attempt.
///
/// Constructed once per adapter invocation and never mutated. `error` is
/// present exactly when `success` is false; `delivery_id` only appears for
/// backends that assign a message identifier (Telegram).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub platform: Platform,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<String>,
}

impl DeliveryOutcome {
    /// Successful delivery without a backend-assigned id.
    pub fn ok(platform: Platform) -> Self {
        DeliveryOutcome {
            platform,
            success: true,
            error: None,
            delivery_id: None,
        }
    }

    /// Successful delivery carrying the backend's message identifier.
    pub fn ok_with_id(platform: Platform, delivery_id: impl Into<String>) -> Self {
        DeliveryOutcome {
            platform,
            success: true,
            error: None,
            delivery_id: Some(delivery_id.into()),
        }
    }

    /// Failed delivery with the reason reported by transport or backend.
    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        DeliveryOutcome {
            platform,
            success: false,
            error: Some(error.into()),
            delivery_id: None,
        }
    }

    /// One breakdown line in the rendered dispatch report.
    pub fn render_line(&self) -> String {
        if self.success {
            format!("{}: ✓ Success", self.platform)
        } else {
            format!(
                "{}: ✗ Failed - {}",
                self.platform,
                self.error.as_deref().unwrap_or("Unknown error")
            )
        }
    }
}

/// Ordered outcomes of one dispatch call plus the derived summary.
///
/// Outcome order always matches the caller's requested target order,
/// regardless of which delivery finished first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DispatchResult {
    pub fn new(outcomes: Vec<DeliveryOutcome>) -> Self {
        DispatchResult { outcomes }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    /// `"{succeeded}/{total} platform(s) notified"`
    pub fn summary_line(&self) -> String {
        format!("{}/{} platform(s) notified", self.succeeded(), self.total())
    }

    /// Full human-readable report: summary line, blank line, one line
    /// per outcome in request order.
    pub fn render(&self) -> String {
        let mut out = self.summary_line();
        if !self.outcomes.is_empty() {
            out.push_str("\n\n");
            let lines: Vec<String> = self.outcomes.iter().map(|o| o.render_line()).collect();
            out.push_str(&lines.join("\n"));
        }
        out
    }
}
