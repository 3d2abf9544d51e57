//! Points leaderboard.
//!
//! The ranking request is bounded by its own, shorter timeout. When it
//! expires the page reports a failure instead of waiting on the backend.

use std::fmt;

use super::PageError;
use crate::api::{ApiClient, ApiRequest};
use crate::models::LeaderboardEntry;

#[derive(Debug, Clone)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    /// Id of the viewer, highlighted in the table
    pub viewer: Option<String>,
}

pub async fn load_leaderboard(
    client: &ApiClient,
    viewer: Option<String>,
) -> Result<Leaderboard, PageError> {
    let request = ApiRequest::get("/api/points-table").timeout(client.ranking_timeout());
    let mut entries: Vec<LeaderboardEntry> = client.execute(request).await?;
    // Stable, so ties keep the backend's order
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    Ok(Leaderboard { entries, viewer })
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "No points awarded yet.");
        }
        writeln!(f, "{:>4}  {:<24}  {:<16}  {:>6}", "RANK", "NAME", "CLUB", "POINTS")?;
        for (i, entry) in self.entries.iter().enumerate() {
            let marker = if self.viewer.as_deref() == Some(entry.id.as_str()) {
                " <- you"
            } else {
                ""
            };
            writeln!(
                f,
                "{:>4}  {:<24}  {:<16}  {:>6}{}",
                i + 1,
                entry.name,
                entry.club.as_deref().unwrap_or("-"),
                entry.points,
                marker
            )?;
        }
        Ok(())
    }
}
