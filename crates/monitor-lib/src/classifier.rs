//! Risk classification
//!
//! Maps a continuous landslide risk score to a severity tier and the
//! presentation attributes driven by that tier: color, icon, description
//! and the ordered list of safety recommendations.
//!
//! Tier boundaries are half-open and inclusive of the lower bound:
//! `[0, 0.3)` Low, `[0.3, 0.6)` Moderate, `[0.6, 1.0]` High.

use serde::{Deserialize, Serialize};

/// Lower bound of the Moderate tier
pub const MODERATE_THRESHOLD: f64 = 0.3;

/// Lower bound of the High tier
pub const HIGH_THRESHOLD: f64 = 0.6;

/// Landslide risk tiers, in ascending order of severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Stable lowercase name, used in metrics labels and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
        }
    }

    /// Hex color of the tier
    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Low => "#4caf50",
            RiskTier::Moderate => "#ff9800",
            RiskTier::High => "#f44336",
        }
    }

    /// Color of the tier as an RGB triple
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            RiskTier::Low => (0x4c, 0xaf, 0x50),
            RiskTier::Moderate => (0xff, 0x98, 0x00),
            RiskTier::High => (0xf4, 0x43, 0x36),
        }
    }

    pub fn icon(&self) -> StatusIcon {
        match self {
            RiskTier::Low => StatusIcon::CheckCircle,
            RiskTier::Moderate => StatusIcon::Warning,
            RiskTier::High => StatusIcon::Error,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low landslide risk",
            RiskTier::Moderate => "Moderate landslide risk",
            RiskTier::High => "High landslide risk",
        }
    }

    /// Severity of the banner shown above the recommendations
    pub fn alert_severity(&self) -> &'static str {
        match self {
            RiskTier::Low => "success",
            RiskTier::Moderate => "warning",
            RiskTier::High => "error",
        }
    }

    pub fn recommendations(&self) -> &'static [Recommendation] {
        match self {
            RiskTier::Low => LOW_RECOMMENDATIONS,
            RiskTier::Moderate => MODERATE_RECOMMENDATIONS,
            RiskTier::High => HIGH_RECOMMENDATIONS,
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Moderate => write!(f, "Moderate"),
            RiskTier::High => write!(f, "High"),
        }
    }
}

/// Icon shown next to the current status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    CheckCircle,
    Warning,
    Error,
}

impl StatusIcon {
    /// Terminal glyph for the icon
    pub fn symbol(&self) -> &'static str {
        match self {
            StatusIcon::CheckCircle => "✓",
            StatusIcon::Warning => "⚠",
            StatusIcon::Error => "✗",
        }
    }
}

/// A safety recommendation: short headline plus supporting detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub headline: &'static str,
    pub detail: &'static str,
}

const LOW_RECOMMENDATIONS: &[Recommendation] = &[
    Recommendation {
        headline: "Stay informed about weather conditions",
        detail: "Follow the weather forecast and official alerts.",
    },
    Recommendation {
        headline: "Check the terrain regularly",
        detail: "Watch for changes in slope or cracks in the ground.",
    },
];

const MODERATE_RECOMMENDATIONS: &[Recommendation] = &[
    Recommendation {
        headline: "Watch for changes in the terrain",
        detail: "Look out for cracks, leaning trees or unusual noises.",
    },
    Recommendation {
        headline: "Avoid steep slopes",
        detail: "Keep away from hillsides and sloped areas.",
    },
    Recommendation {
        headline: "Monitor rainfall levels",
        detail: "Heavy rain can increase the risk of landslides.",
    },
];

const HIGH_RECOMMENDATIONS: &[Recommendation] = &[
    Recommendation {
        headline: "Avoid staying in risk areas",
        detail: "Move to a safe place immediately.",
    },
    Recommendation {
        headline: "Seek shelter in a safe location",
        detail: "Head to flat areas away from slopes.",
    },
    Recommendation {
        headline: "Follow Civil Defense guidance",
        detail: "Follow the official instructions for your region.",
    },
    Recommendation {
        headline: "Stay informed about updates",
        detail: "Keep track of official communication channels.",
    },
];

/// Everything the status panel needs for one risk score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub tier: RiskTier,
    pub color: &'static str,
    pub icon: StatusIcon,
    pub description: &'static str,
    pub alert_severity: &'static str,
    pub recommendations: &'static [Recommendation],
}

impl From<RiskTier> for Classification {
    fn from(tier: RiskTier) -> Self {
        Self {
            tier,
            color: tier.color(),
            icon: tier.icon(),
            description: tier.description(),
            alert_severity: tier.alert_severity(),
            recommendations: tier.recommendations(),
        }
    }
}

/// Classify a risk score
///
/// Total over `f64`: negative scores fall to Low, scores above 1 to High.
/// NaN fails both comparisons and classifies High.
pub fn classify(risk_level: f64) -> Classification {
    let tier = if risk_level < MODERATE_THRESHOLD {
        RiskTier::Low
    } else if risk_level < HIGH_THRESHOLD {
        RiskTier::Moderate
    } else {
        RiskTier::High
    };

    Classification::from(tier)
}
