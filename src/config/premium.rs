//! Premium entitlement configuration

use serde::Deserialize;

/// How the stored premium flag and the external entitlement combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PremiumPolicy {
    /// Stored flag grants access; an external entitlement also grants it
    #[default]
    StoredFlag,
    /// Only the external entitlement counts
    Entitlement,
}

impl PremiumPolicy {
    /// Combine the two sources. `entitlement` is only queried when it can matter.
    #[inline]
    pub fn resolve(self, premium_owned: bool, entitlement: impl FnOnce() -> bool) -> bool {
        match self {
            PremiumPolicy::StoredFlag => premium_owned || entitlement(),
            PremiumPolicy::Entitlement => entitlement(),
        }
    }
}

/// `premium` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PremiumConfig {
    pub policy: PremiumPolicy,
    /// Key handed to the entitlement check, e.g. a permission node
    pub entitlement_key: String,
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            policy: PremiumPolicy::default(),
            entitlement_key: "battlepass.premium".to_string(),
        }
    }
}
