use serde::{Deserialize, Serialize};

/// Appointment lifecycle. Ids match the seeded `statuses` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Reserved,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn id(self) -> i32 {
        match self {
            Self::Reserved => 1,
            Self::Cancelled => 2,
            Self::Completed => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Reserved),
            2 => Some(Self::Cancelled),
            3 => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reserved => write!(f, "Reserved"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for status in [
            AppointmentStatus::Reserved,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            assert_eq!(AppointmentStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(AppointmentStatus::from_id(9), None);
    }
}
