//! Three-valued handler decision.
//!
//! A handler either allows, denies, or declines to express an opinion. The
//! abstain/deny distinction matters: the composite policy default-denies a
//! requirement nobody allowed, but an explicit deny also vetoes allowances
//! from other handlers.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Abstain,
    Deny,
}

impl Decision {
    #[must_use]
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }

    #[must_use]
    pub const fn is_abstain(self) -> bool {
        matches!(self, Self::Abstain)
    }

    #[must_use]
    pub const fn is_deny(self) -> bool {
        matches!(self, Self::Deny)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Allow => "allow",
            Self::Abstain => "abstain",
            Self::Deny => "deny",
        };
        f.write_str(s)
    }
}
