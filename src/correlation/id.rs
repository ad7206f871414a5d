//! Correlation identifier generation

use chrono::Utc;
use uuid::Uuid;

/// Generate a new correlation identifier.
///
/// Format: `corr-<UTC timestamp>-<8 hex chars>`. The timestamp prefix keeps
/// identifiers roughly sortable by creation order, which helps when eyeballing
/// logs; the random suffix makes collisions vanishingly unlikely.
///
/// Never returns an empty string and never fails.
pub fn generate() -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let random = Uuid::new_v4().simple().to_string();
    format!("corr-{}-{}", timestamp, &random[..8])
}
