//! Adaptation strategy selection
//!
//! A strategy is the concrete set of payload-shaping parameters applied to
//! a response. It is computed per request as the merge of two independent
//! dimension strategies, one derived from the battery level and one from
//! the network conditions. The merge is conservative: boolean pressure
//! from either dimension wins, and numeric budgets take the stricter of
//! the two recommendations.

use crate::context::{ClientContext, EffectiveType, NetworkType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How hard a dimension is pushing for savings, ordered from most
/// permissive to most conservative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyTier {
    Relaxed,
    Moderate,
    Aggressive,
}

impl StrategyTier {
    /// Whether this tier counts as "optimization applied" for response
    /// headers
    pub fn is_applied(&self) -> bool {
        *self > StrategyTier::Relaxed
    }
}

impl fmt::Display for StrategyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyTier::Relaxed => write!(f, "relaxed"),
            StrategyTier::Moderate => write!(f, "moderate"),
            StrategyTier::Aggressive => write!(f, "aggressive"),
        }
    }
}

/// Payload-shaping parameters for a single request
///
/// Pure derived value: recomputed per request from [`ClientContext`],
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationStrategy {
    pub disable_animations: bool,
    pub reduce_polling_frequency: bool,
    pub disable_background_sync: bool,
    pub compress_images: bool,
    /// Image quality budget, 1-100
    pub image_quality: u8,
    /// Maximum image width budget in pixels
    pub max_image_width: u32,
    pub enable_pagination: bool,
    pub page_size: usize,
    pub omit_null_values: bool,
    pub compress_response: bool,
}

impl Default for AdaptationStrategy {
    fn default() -> Self {
        // The relaxed baseline: no pressure from either dimension.
        Self {
            disable_animations: false,
            reduce_polling_frequency: false,
            disable_background_sync: false,
            compress_images: false,
            image_quality: 80,
            max_image_width: 300,
            enable_pagination: false,
            page_size: 50,
            omit_null_values: false,
            compress_response: false,
        }
    }
}

/// The merged strategy for a request together with the tier each
/// dimension selected
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedStrategy {
    pub strategy: AdaptationStrategy,
    pub battery_tier: StrategyTier,
    pub network_tier: StrategyTier,
}

impl SelectedStrategy {
    /// Whether the battery dimension selected a non-relaxed branch
    pub fn battery_optimization_applied(&self) -> bool {
        self.battery_tier.is_applied()
    }

    /// Whether the network dimension selected a non-relaxed branch
    pub fn network_optimization_applied(&self) -> bool {
        self.network_tier.is_applied()
    }
}

/// Battery dimension strategy, thresholded on the reported level
///
/// Fields the battery dimension has no opinion on stay at the relaxed
/// baseline so the merge cannot tighten them from this side.
pub fn battery_strategy(battery_level: u8) -> (StrategyTier, AdaptationStrategy) {
    if battery_level <= 15 {
        (
            StrategyTier::Aggressive,
            AdaptationStrategy {
                disable_animations: true,
                reduce_polling_frequency: true,
                disable_background_sync: true,
                compress_images: true,
                image_quality: 60,
                max_image_width: 200,
                ..Default::default()
            },
        )
    } else if battery_level <= 30 {
        (
            StrategyTier::Moderate,
            AdaptationStrategy {
                reduce_polling_frequency: true,
                compress_images: true,
                image_quality: 70,
                max_image_width: 250,
                ..Default::default()
            },
        )
    } else {
        (StrategyTier::Relaxed, AdaptationStrategy::default())
    }
}

/// Network dimension strategy, thresholded on the effective type
pub fn network_strategy(context: &ClientContext) -> (StrategyTier, AdaptationStrategy) {
    if context.network_type == NetworkType::Cellular
        && context.effective_type == EffectiveType::Slow2g
    {
        (
            StrategyTier::Aggressive,
            AdaptationStrategy {
                compress_response: true,
                omit_null_values: true,
                image_quality: 50,
                max_image_width: 150,
                enable_pagination: true,
                page_size: 10,
                ..Default::default()
            },
        )
    } else if matches!(
        context.effective_type,
        EffectiveType::TwoG | EffectiveType::ThreeG
    ) {
        (
            StrategyTier::Moderate,
            AdaptationStrategy {
                compress_response: true,
                image_quality: 70,
                max_image_width: 200,
                enable_pagination: true,
                page_size: 20,
                ..Default::default()
            },
        )
    } else {
        (StrategyTier::Relaxed, AdaptationStrategy::default())
    }
}

/// Merge two dimension strategies into one
///
/// Booleans are ORed (either source of pressure forces the conservative
/// behavior); numeric budgets take the minimum (the stricter constraint
/// wins). The merge is monotonic: a component-wise worse context can
/// never produce a less conservative merged strategy.
pub fn merge(a: &AdaptationStrategy, b: &AdaptationStrategy) -> AdaptationStrategy {
    AdaptationStrategy {
        disable_animations: a.disable_animations || b.disable_animations,
        reduce_polling_frequency: a.reduce_polling_frequency || b.reduce_polling_frequency,
        disable_background_sync: a.disable_background_sync || b.disable_background_sync,
        compress_images: a.compress_images || b.compress_images,
        image_quality: a.image_quality.min(b.image_quality),
        max_image_width: a.max_image_width.min(b.max_image_width),
        enable_pagination: a.enable_pagination || b.enable_pagination,
        page_size: a.page_size.min(b.page_size),
        omit_null_values: a.omit_null_values || b.omit_null_values,
        compress_response: a.compress_response || b.compress_response,
    }
}

/// Select the adaptation strategy for a request
pub fn select(context: &ClientContext) -> SelectedStrategy {
    let (battery_tier, battery) = battery_strategy(context.battery_level);
    let (network_tier, network) = network_strategy(context);

    SelectedStrategy {
        strategy: merge(&battery, &network),
        battery_tier,
        network_tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(battery: u8, network: NetworkType, effective: EffectiveType) -> ClientContext {
        ClientContext {
            battery_level: battery,
            network_type: network,
            effective_type: effective,
            ..Default::default()
        }
    }

    #[test]
    fn test_low_battery_on_wifi() {
        // battery=10, wifi/4g: battery aggressive, network relaxed
        let selected = select(&ctx(10, NetworkType::Wifi, EffectiveType::FourG));

        assert_eq!(selected.battery_tier, StrategyTier::Aggressive);
        assert_eq!(selected.network_tier, StrategyTier::Relaxed);
        assert!(selected.battery_optimization_applied());
        assert!(!selected.network_optimization_applied());

        let s = selected.strategy;
        assert_eq!(s.image_quality, 60);
        assert_eq!(s.max_image_width, 200);
        assert!(s.disable_animations);
        assert!(!s.compress_response);
        assert_eq!(s.page_size, 50);
    }

    #[test]
    fn test_full_battery_on_slow_cellular() {
        // battery=100, cellular/slow-2g: battery relaxed, network aggressive
        let selected = select(&ctx(100, NetworkType::Cellular, EffectiveType::Slow2g));

        assert_eq!(selected.battery_tier, StrategyTier::Relaxed);
        assert_eq!(selected.network_tier, StrategyTier::Aggressive);

        let s = selected.strategy;
        assert_eq!(s.image_quality, 50); // min of 80 and 50
        assert!(s.compress_response);
        assert!(s.enable_pagination);
        assert_eq!(s.page_size, 10);
        assert!(!s.disable_animations);
        assert!(s.omit_null_values);
    }

    #[test]
    fn test_slow_2g_on_wifi_is_relaxed() {
        // The aggressive network branch requires cellular transport.
        let (tier, _) = network_strategy(&ctx(100, NetworkType::Wifi, EffectiveType::Slow2g));
        assert_eq!(tier, StrategyTier::Relaxed);
    }

    #[test]
    fn test_moderate_network_tiers() {
        for effective in [EffectiveType::TwoG, EffectiveType::ThreeG] {
            let (tier, s) = network_strategy(&ctx(100, NetworkType::Wifi, effective));
            assert_eq!(tier, StrategyTier::Moderate);
            assert!(s.compress_response);
            assert_eq!(s.page_size, 20);
            assert!(!s.omit_null_values);
        }
    }

    #[test]
    fn test_battery_thresholds() {
        assert_eq!(battery_strategy(0).0, StrategyTier::Aggressive);
        assert_eq!(battery_strategy(15).0, StrategyTier::Aggressive);
        assert_eq!(battery_strategy(16).0, StrategyTier::Moderate);
        assert_eq!(battery_strategy(30).0, StrategyTier::Moderate);
        assert_eq!(battery_strategy(31).0, StrategyTier::Relaxed);
        assert_eq!(battery_strategy(100).0, StrategyTier::Relaxed);
    }

    #[test]
    fn test_merge_rules() {
        let a = AdaptationStrategy {
            disable_animations: true,
            image_quality: 60,
            page_size: 50,
            ..Default::default()
        };
        let b = AdaptationStrategy {
            compress_response: true,
            image_quality: 80,
            page_size: 10,
            ..Default::default()
        };

        let merged = merge(&a, &b);
        assert!(merged.disable_animations);
        assert!(merged.compress_response);
        assert_eq!(merged.image_quality, 60);
        assert_eq!(merged.page_size, 10);
    }

    /// Core property: for any fixed network context, a lower battery
    /// level never yields a less conservative merged strategy.
    #[test]
    fn test_battery_monotonicity() {
        let networks = [
            (NetworkType::Wifi, EffectiveType::FourG),
            (NetworkType::Cellular, EffectiveType::Slow2g),
            (NetworkType::Cellular, EffectiveType::ThreeG),
            (NetworkType::Wifi, EffectiveType::TwoG),
        ];

        for (network, effective) in networks {
            for battery in 0u8..100 {
                let worse = select(&ctx(battery, network, effective)).strategy;
                let better = select(&ctx(battery + 1, network, effective)).strategy;

                // Numeric budgets never loosen as battery drops.
                assert!(worse.image_quality <= better.image_quality);
                assert!(worse.max_image_width <= better.max_image_width);
                assert!(worse.page_size <= better.page_size);

                // Boolean pressure never releases as battery drops.
                assert!(worse.disable_animations || !better.disable_animations);
                assert!(worse.reduce_polling_frequency || !better.reduce_polling_frequency);
                assert!(worse.disable_background_sync || !better.disable_background_sync);
                assert!(worse.compress_images || !better.compress_images);
                assert!(worse.enable_pagination || !better.enable_pagination);
                assert!(worse.omit_null_values || !better.omit_null_values);
                assert!(worse.compress_response || !better.compress_response);
            }
        }
    }
}
