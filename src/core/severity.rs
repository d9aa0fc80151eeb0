//! Severity classification for usage percentages.

use serde::{Deserialize, Serialize};

/// Ordered severity levels for context usage.
///
/// Breakpoints are inclusive on the lower bound:
/// `[0,60)` Healthy, `[60,80)` Elevated, `[80,90)` Warning, `[90,100]` Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Healthy,
    Elevated,
    Warning,
    Critical,
}

impl SeverityLevel {
    /// All levels from least to most severe.
    pub const ALL: &'static [Self] = &[Self::Healthy, Self::Elevated, Self::Warning, Self::Critical];

    /// Classify a usage percentage.
    ///
    /// Values above 100 land in `Critical`; there is no error case.
    #[must_use]
    pub const fn classify(percentage: u32) -> Self {
        match percentage {
            0..60 => Self::Healthy,
            60..80 => Self::Elevated,
            80..90 => Self::Warning,
            _ => Self::Critical,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Elevated => "elevated",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Returns an icon for the severity level.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Healthy => "✓",
            Self::Elevated => "●",
            Self::Warning => "⚠",
            Self::Critical => "✗",
        }
    }

    /// Returns a color name for the severity level.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Healthy => "green",
            Self::Elevated => "cyan",
            Self::Warning => "yellow",
            Self::Critical => "red",
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_exact() {
        assert_eq!(SeverityLevel::classify(0), SeverityLevel::Healthy);
        assert_eq!(SeverityLevel::classify(59), SeverityLevel::Healthy);
        assert_eq!(SeverityLevel::classify(60), SeverityLevel::Elevated);
        assert_eq!(SeverityLevel::classify(79), SeverityLevel::Elevated);
        assert_eq!(SeverityLevel::classify(80), SeverityLevel::Warning);
        assert_eq!(SeverityLevel::classify(89), SeverityLevel::Warning);
        assert_eq!(SeverityLevel::classify(90), SeverityLevel::Critical);
        assert_eq!(SeverityLevel::classify(100), SeverityLevel::Critical);
    }

    #[test]
    fn out_of_range_clamps_to_critical() {
        assert_eq!(SeverityLevel::classify(101), SeverityLevel::Critical);
        assert_eq!(SeverityLevel::classify(u32::MAX), SeverityLevel::Critical);
    }

    #[test]
    fn levels_are_totally_ordered() {
        assert!(SeverityLevel::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn classification_is_monotonic() {
        let mut previous = SeverityLevel::Healthy;
        for pct in 0..=120 {
            let level = SeverityLevel::classify(pct);
            assert!(level >= previous, "{pct}% went from {previous} to {level}");
            previous = level;
        }
    }
}
