use serde::{Deserialize, Serialize};

/// Rendering fidelity level, ordered from cheapest to richest.
///
/// Governs the sample budget and draw density of a visualization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Minimal,
    Standard,
    High,
    Maximum,
}

impl QualityTier {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "minimal" => Some(Self::Minimal),
            "standard" => Some(Self::Standard),
            "high" => Some(Self::High),
            "maximum" => Some(Self::Maximum),
            _ => None,
        }
    }

    /// Upper bound on frequency-bar density for this tier.
    pub fn max_bars(self) -> usize {
        match self {
            Self::Minimal => 16,
            Self::Standard => 32,
            Self::High => 64,
            Self::Maximum => 96,
        }
    }
}

/// Declared device capabilities, injected by the host.
///
/// Replaces runtime timing probes: the host describes the device once
/// and the pipeline picks a tier from the declared figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub cpu_cores: u32,
    pub memory_mb: u64,
    pub low_power: bool,
}

/// Resolve the effective tier: explicit per-call tier wins, then the
/// device heuristic, then `Standard`.
pub fn resolve_tier(explicit: Option<QualityTier>, device: Option<&DeviceProfile>) -> QualityTier {
    if let Some(tier) = explicit {
        return tier;
    }

    match device {
        Some(profile) => {
            if profile.low_power || profile.cpu_cores <= 2 || profile.memory_mb < 1024 {
                QualityTier::Minimal
            } else if profile.cpu_cores >= 8 && profile.memory_mb >= 4096 {
                QualityTier::High
            } else {
                QualityTier::Standard
            }
        }
        None => QualityTier::Standard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(QualityTier::Minimal < QualityTier::Standard);
        assert!(QualityTier::Standard < QualityTier::High);
        assert!(QualityTier::High < QualityTier::Maximum);
    }

    #[test]
    fn explicit_tier_wins_over_device() {
        let weak = DeviceProfile {
            cpu_cores: 1,
            memory_mb: 512,
            low_power: true,
        };
        assert_eq!(
            resolve_tier(Some(QualityTier::Maximum), Some(&weak)),
            QualityTier::Maximum
        );
    }

    #[test]
    fn device_heuristic_brackets() {
        let weak = DeviceProfile {
            cpu_cores: 2,
            memory_mb: 2048,
            low_power: false,
        };
        let strong = DeviceProfile {
            cpu_cores: 10,
            memory_mb: 8192,
            low_power: false,
        };
        let mid = DeviceProfile {
            cpu_cores: 4,
            memory_mb: 2048,
            low_power: false,
        };
        assert_eq!(resolve_tier(None, Some(&weak)), QualityTier::Minimal);
        assert_eq!(resolve_tier(None, Some(&strong)), QualityTier::High);
        assert_eq!(resolve_tier(None, Some(&mid)), QualityTier::Standard);
        assert_eq!(resolve_tier(None, None), QualityTier::Standard);
    }
}
