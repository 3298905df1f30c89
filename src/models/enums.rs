use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Patient => "patient",
    Doctor => "doctor",
    LabTechnician => "lab_technician",
    Pharmacist => "pharmacist",
    Admin => "admin",
    Nurse => "nurse",
});

str_enum!(AppointmentStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(LabRequestStatus {
    AwaitingPayment => "awaiting_payment",
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
});

str_enum!(LabResultStatus {
    Positive => "positive",
    Negative => "negative",
    Inconclusive => "inconclusive",
});

str_enum!(PrescriptionStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
    Paid => "paid",
});

str_enum!(PharmacyRequestStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
});

str_enum!(PaymentType {
    Consultation => "consultation",
    LabTest => "lab_test",
    Medication => "medication",
});

str_enum!(PaymentStatus {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips() {
        for role in [
            Role::Patient,
            Role::Doctor,
            Role::LabTechnician,
            Role::Pharmacist,
            Role::Admin,
            Role::Nurse,
        ] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = AppointmentStatus::from_str("scheduled").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&PaymentType::LabTest).unwrap();
        assert_eq!(json, "\"lab_test\"");
        let back: LabRequestStatus = serde_json::from_str("\"awaiting_payment\"").unwrap();
        assert_eq!(back, LabRequestStatus::AwaitingPayment);
    }
}
