//! Human-readable labels for hour buckets and clients

use chrono::DateTime;

use crate::storage::schema::{Channel, ClientInfo};

/// Label for clients missing from the directory
pub const UNKNOWN_CLIENT: &str = "(Unknown)";

const SECONDS_PER_HOUR: i64 = 3600;

/// Format an epoch-hour bucket, e.g. `2024-03-01, 14:00 - 14:59 UTC`
pub fn format_hour(hour: i64) -> String {
    hour.checked_mul(SECONDS_PER_HOUR)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d, %H:00 - %H:59 UTC").to_string())
        .unwrap_or_else(|| format!("hour {hour}"))
}

/// Format a client directory entry for the dashboard
///
/// `None` (client id not in the directory) renders as [`UNKNOWN_CLIENT`].
pub fn format_client(client: Option<&ClientInfo>) -> String {
    let Some(client) = client else {
        return UNKNOWN_CLIENT.to_string();
    };

    let mut version = client.version.clone();
    if client.program == "msn" {
        match client.via {
            // WebTV builds can't be told apart yet; show what they report
            Channel::WebTv => version = format!("WebTV Client ({})", client.version),
            _ => {
                if let Some(dialect) = parse_dialect(&client.version) {
                    version = guess_msn_version(dialect);
                }
            }
        }
    }

    let mut label = format!("{} {}", client.program.to_uppercase(), version);
    if let Channel::Other(via) = &client.via {
        label.push_str(", ");
        label.push_str(&via.to_uppercase());
    }
    label
}

/// Extract `n` from a bare `MSNPn` dialect string
pub fn parse_dialect(version: &str) -> Option<u32> {
    version.strip_prefix("MSNP")?.parse().ok()
}

/// Map an MSNP dialect to the messenger generation that spoke it
pub fn guess_msn_version(dialect: u32) -> String {
    match dialect {
        0..=2 => "1.?".to_string(),
        3..=4 => "2.?".to_string(),
        5 => "3.?".to_string(),
        6..=7 => "4.?".to_string(),
        _ => format!("?/MSNP{dialect}"),
    }
}
