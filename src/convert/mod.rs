//! PDF conversion backends.
//!
//! Neither backend is required for the service to run. Availability is
//! probed on every call and reported as a [`Capability`], so an external
//! dependency that comes back is picked up without a restart.

pub mod gotenberg;
pub mod office;

pub use gotenberg::GotenbergClient;
pub use office::OfficeConverter;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum Capability {
    Available,
    /// The backend answered, or failed to answer, in a way that means it
    /// cannot be used right now.
    Unavailable(String),
    /// The probe itself failed unexpectedly.
    Unknown(String),
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Capability::Available => "available",
            Capability::Unavailable(_) => "unavailable",
            Capability::Unknown(_) => "unknown",
        }
    }

    /// Why the backend cannot be used, if it cannot.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Capability::Available => None,
            Capability::Unavailable(reason) | Capability::Unknown(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_labels() {
        assert_eq!(Capability::Available.label(), "available");
        assert!(Capability::Available.reason().is_none());

        let down = Capability::Unavailable("connection refused".into());
        assert!(!down.is_available());
        assert_eq!(down.reason(), Some("connection refused"));

        assert_eq!(Capability::Unknown("boom".into()).label(), "unknown");
    }

    #[test]
    fn test_capability_serializes_with_detail() {
        let json = serde_json::to_value(Capability::Unavailable("offline".into())).unwrap();
        assert_eq!(json["state"], "unavailable");
        assert_eq!(json["detail"], "offline");
    }
}
