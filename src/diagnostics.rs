//! One-line diagnostics for skipped runs and failed requests.

use crate::config::RunId;
use crate::error::QaError;
use tracing::Level;

/// Level handed to the subscriber. Skip lines are `warn`, so the filter
/// never goes below it.
pub fn subscriber_level(requested: Level) -> Level {
    requested.max(Level::WARN)
}

pub fn skip(hist_name: &str, run: &RunId, err: &QaError) {
    tracing::warn!("skipping run {} for {}: {}", run, hist_name, err);
}

pub fn request_failed(hist_name: &str, err: &QaError) {
    match err {
        QaError::EmptyOverlay(_) => tracing::warn!("{}", err),
        _ => tracing::error!("request {} failed: {}", hist_name, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn skip_lines_survive_quiet_levels() {
        assert_eq!(subscriber_level(Level::ERROR), Level::WARN);
        assert_eq!(subscriber_level(Level::WARN), Level::WARN);
        assert_eq!(subscriber_level(Level::INFO), Level::INFO);
        assert_eq!(subscriber_level(Level::TRACE), Level::TRACE);
    }
}
