//! Single-use overflow shield.
use serde::{Deserialize, Serialize};

use crate::data::Attribute;

/// Blocks exactly one overflow on the protected attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShieldModule {
    protected: Option<Attribute>,
}

impl ShieldModule {
    /// Arm the shield. Re-arming replaces the protected attribute.
    pub fn arm(&mut self, attribute: Attribute) {
        self.protected = Some(attribute);
    }

    /// Consume the shield if it protects `attribute`.
    pub fn try_block(&mut self, attribute: Attribute) -> bool {
        if self.protected == Some(attribute) {
            self.protected = None;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.protected = None;
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.protected.is_some()
    }

    #[must_use]
    pub const fn protected(&self) -> Option<Attribute> {
        self.protected
    }
}
