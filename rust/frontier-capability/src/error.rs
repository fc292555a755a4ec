use frontier_common::{Address, EntityId};
use std::fmt::{Display, Formatter};

/// Why a capability was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The presented capability does not descend from the root capability
    /// that governs the operation.
    ForeignRoot {
        /// Root capability the operation answers to.
        expected: EntityId,
        /// Root capability the presented one descends from.
        actual: EntityId,
    },

    /// The bearer of an admin capability is not its principal.
    NotPrincipal {
        /// Principal the capability was issued to.
        principal: Address,
        /// Address that presented it.
        sender: Address,
    },
}

impl Display for Denial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Denial::ForeignRoot { expected, actual } => {
                write!(f, "descends from root {actual}, expected {expected}")
            }
            Denial::NotPrincipal { principal, sender } => {
                write!(f, "held by {sender}, issued to {principal}")
            }
        }
    }
}

/// Errors that can occur while issuing or revoking capabilities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontierCapabilityError {
    /// The parent capability does not entitle the caller to the operation.
    #[error("Unauthorized: capability {capability} {denial}")]
    Unauthorized {
        /// The capability that was presented as authority.
        capability: EntityId,
        /// What was wrong with it.
        denial: Denial,
    },

    /// The operating system could not supply entropy for a root capability.
    #[error("Failed to draw root capability entropy: {0}")]
    Entropy(#[from] getrandom::Error),
}

impl FrontierCapabilityError {
    /// Refusal of `capability` because it descends from `actual` rather
    /// than `expected`.
    pub fn foreign_root(capability: EntityId, expected: EntityId, actual: EntityId) -> Self {
        FrontierCapabilityError::Unauthorized {
            capability,
            denial: Denial::ForeignRoot { expected, actual },
        }
    }
}
