use shared_types::ServiceUri;
use std::fmt;

/// Role of this instance within its domain.
///
/// An instance is `Replica` until the oracle names it primary, including while
/// no primary is known at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    Primary,
    #[default]
    Replica,
}

impl Role {
    pub fn for_instance(local: &ServiceUri, primary: Option<&ServiceUri>) -> Self {
        match primary {
            Some(primary) if primary == local => Role::Primary,
            _ => Role::Replica,
        }
    }

    pub fn is_primary(self) -> bool {
        matches!(self, Role::Primary)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Primary => f.write_str("primary"),
            Role::Replica => f.write_str("replica"),
        }
    }
}
