//! Probability → verdict mapping.

use std::fmt;

use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// Categorical outcome shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Authentic,
    Suspicious,
    Fake,
    Unknown,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Authentic => "AUTHENTIC",
            Status::Suspicious => "SUSPICIOUS",
            Status::Fake => "FAKE",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band edges on the fake probability. Below `suspicious_from` is
/// authentic, at or above `fake_from` is fake, everything between is
/// suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub suspicious_from: f32,
    pub fake_from: f32,
}

impl Thresholds {
    pub const STANDARD: Thresholds = Thresholds {
        suspicious_from: 0.35,
        fake_from: 0.65,
    };

    /// Wider suspicious band.
    pub const WIDE: Thresholds = Thresholds {
        suspicious_from: 0.30,
        fake_from: 0.70,
    };

    pub fn new(suspicious_from: f32, fake_from: f32) -> Result<Self> {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit(suspicious_from) || !in_unit(fake_from) {
            return Err(AnalysisError::InvalidConfig(format!(
                "thresholds must lie in [0, 1] (got {suspicious_from} and {fake_from})"
            )));
        }
        if suspicious_from >= fake_from {
            return Err(AnalysisError::InvalidConfig(format!(
                "suspicious threshold {suspicious_from} must be below fake threshold {fake_from}"
            )));
        }
        Ok(Self {
            suspicious_from,
            fake_from,
        })
    }

    pub fn status_for(&self, probability: f32) -> Status {
        if probability < self.suspicious_from {
            Status::Authentic
        } else if probability < self.fake_from {
            Status::Suspicious
        } else {
            Status::Fake
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Verdict derived from a single probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub status: Status,
    pub confidence: u8,
    pub reasoning: Vec<String>,
}

/// Map a fake probability onto status, confidence and reasoning.
pub fn assess(probability: f32, thresholds: &Thresholds) -> Assessment {
    let status = thresholds.status_for(probability);
    let p = f64::from(probability);

    let (raw, reasoning) = match status {
        Status::Authentic => (
            ((1.0 - p) * 100.0).round(),
            vec![
                "Visual analysis indicates authentic product".to_string(),
                "Packaging quality meets genuine standards".to_string(),
                format!("Authenticity probability: {:.1}%", (1.0 - p) * 100.0),
            ],
        ),
        Status::Suspicious => {
            let raw = ((1.0 - 2.0 * (p - 0.5).abs()) * 100.0).round().max(50.0);
            (
                raw,
                vec![
                    "Mixed authenticity signals detected".to_string(),
                    "Further verification recommended".to_string(),
                    format!("Confidence level: {}%", clamp_confidence(raw)),
                ],
            )
        }
        Status::Fake | Status::Unknown => (
            (p * 100.0).round(),
            vec![
                "Strong indicators of counterfeit product detected".to_string(),
                "Packaging analysis shows inconsistencies".to_string(),
                format!("Counterfeit probability: {:.1}%", p * 100.0),
            ],
        ),
    };

    Assessment {
        status,
        confidence: clamp_confidence(raw),
        reasoning,
    }
}

fn clamp_confidence(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(p: f32) -> Assessment {
        assess(p, &Thresholds::STANDARD)
    }

    #[test]
    fn documented_scenarios() {
        let a = standard(0.10);
        assert_eq!(a.status, Status::Authentic);
        assert_eq!(a.confidence, 90);

        let s = standard(0.50);
        assert_eq!(s.status, Status::Suspicious);
        assert_eq!(s.confidence, 100);

        let f = standard(0.90);
        assert_eq!(f.status, Status::Fake);
        assert_eq!(f.confidence, 90);
    }

    #[test]
    fn authentic_band_confidence_tracks_complement() {
        for p in [0.0f32, 0.01, 0.123, 0.2, 0.3, 0.349] {
            let a = standard(p);
            assert_eq!(a.status, Status::Authentic, "p = {p}");
            let expected = ((1.0 - f64::from(p)) * 100.0).round().min(100.0) as u8;
            assert_eq!(a.confidence, expected, "p = {p}");
        }
    }

    #[test]
    fn fake_band_confidence_tracks_probability() {
        for p in [0.65f32, 0.7, 0.8123, 0.99, 1.0] {
            let a = standard(p);
            assert_eq!(a.status, Status::Fake, "p = {p}");
            assert_eq!(a.confidence, (f64::from(p) * 100.0).round() as u8, "p = {p}");
        }
    }

    #[test]
    fn suspicious_band_never_drops_below_fifty() {
        for p in [0.35f32, 0.36, 0.4, 0.45, 0.5, 0.55, 0.6, 0.649] {
            let a = standard(p);
            assert_eq!(a.status, Status::Suspicious, "p = {p}");
            assert!(a.confidence >= 50, "p = {p}, confidence = {}", a.confidence);
            assert!(a.confidence <= 100);
        }
        assert_eq!(standard(0.40).confidence, 80);
    }

    #[test]
    fn lower_edges_are_inclusive() {
        assert_eq!(standard(0.35).status, Status::Suspicious);
        assert_eq!(standard(0.65).status, Status::Fake);
    }

    #[test]
    fn wide_preset_moves_the_edges() {
        let wide = Thresholds::WIDE;
        assert_eq!(assess(0.32, &wide).status, Status::Suspicious);
        assert_eq!(assess(0.68, &wide).status, Status::Suspicious);
        assert_eq!(assess(0.29, &wide).status, Status::Authentic);
        assert_eq!(assess(0.70, &wide).status, Status::Fake);
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        let low = standard(-0.5);
        assert_eq!(low.status, Status::Authentic);
        assert_eq!(low.confidence, 100);

        let high = standard(1.7);
        assert_eq!(high.status, Status::Fake);
        assert_eq!(high.confidence, 100);
    }

    #[test]
    fn reasoning_mentions_probability() {
        let a = standard(0.10);
        assert_eq!(a.reasoning.len(), 3);
        assert_eq!(a.reasoning[2], "Authenticity probability: 90.0%");

        let f = standard(0.875);
        assert_eq!(f.reasoning[2], "Counterfeit probability: 87.5%");
    }

    #[test]
    fn reasoning_wording_per_band() {
        let a = standard(0.10);
        assert_eq!(a.reasoning[0], "Visual analysis indicates authentic product");
        assert_eq!(a.reasoning[1], "Packaging quality meets genuine standards");

        let s = standard(0.50);
        assert_eq!(s.reasoning[0], "Mixed authenticity signals detected");
        assert_eq!(s.reasoning[1], "Further verification recommended");
        assert_eq!(s.reasoning[2], "Confidence level: 100%");

        let f = standard(0.90);
        assert_eq!(f.reasoning[0], "Strong indicators of counterfeit product detected");
        assert_eq!(f.reasoning[1], "Packaging analysis shows inconsistencies");
    }

    #[test]
    fn thresholds_are_validated() {
        assert!(Thresholds::new(0.2, 0.8).is_ok());
        assert!(Thresholds::new(0.7, 0.3).is_err());
        assert!(Thresholds::new(0.5, 0.5).is_err());
        assert!(Thresholds::new(-0.1, 0.5).is_err());

        let err = Thresholds::new(0.4, 1.5).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidConfig);
    }

    #[test]
    fn status_serializes_upper_case() {
        assert_eq!(serde_json::to_value(Status::Suspicious).unwrap(), "SUSPICIOUS");
        assert_eq!(Status::Unknown.to_string(), "UNKNOWN");
        assert_eq!(Thresholds::default(), Thresholds::STANDARD);
    }
}
