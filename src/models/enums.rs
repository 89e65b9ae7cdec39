//! Shared domain enums
//!
//! Status and type values arrive from clients and legacy rows in both
//! Portuguese and English. They are translated into these enums on ingress
//! and always written back in their canonical English form.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{postgres::PgTypeInfo, Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements TEXT column support for an enum with `as_str` / `FromStr`.
macro_rules! text_enum_sqlx {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as Decode<Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// AppointmentStatus
// ---------------------------------------------------------------------------

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled appointments never change again on their own
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// Whether the appointment still occupies its staff member's time
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    /// Every status, with canonical value first in each synonym list
    pub fn all() -> [AppointmentStatus; 6] {
        [
            AppointmentStatus::Pending,
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ]
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "pending" | "pendente" => Ok(AppointmentStatus::Pending),
            "scheduled" | "agendado" => Ok(AppointmentStatus::Scheduled),
            "confirmed" | "confirmado" => Ok(AppointmentStatus::Confirmed),
            "in_progress" | "em_andamento" | "em_atendimento" => Ok(AppointmentStatus::InProgress),
            "completed" | "realizado" | "concluido" | "concluído" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" | "cancelado" => Ok(AppointmentStatus::Cancelled),
            _ => Err(format!("Invalid appointment status: {}", s)),
        }
    }
}

text_enum_sqlx!(AppointmentStatus);

// ---------------------------------------------------------------------------
// VacationType
// ---------------------------------------------------------------------------

/// Kind of staff leave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VacationType {
    Vacation,
    SickLeave,
    TimeOff,
}

impl VacationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VacationType::Vacation => "vacation",
            VacationType::SickLeave => "sick_leave",
            VacationType::TimeOff => "time_off",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            VacationType::Vacation => "vacation",
            VacationType::SickLeave => "sick leave",
            VacationType::TimeOff => "time off",
        }
    }
}

impl std::str::FromStr for VacationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vacation" | "ferias" | "férias" => Ok(VacationType::Vacation),
            "sick_leave" | "atestado" => Ok(VacationType::SickLeave),
            "time_off" | "folga" => Ok(VacationType::TimeOff),
            _ => Err(format!("Invalid vacation type: {}", s)),
        }
    }
}

text_enum_sqlx!(VacationType);

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Direction of a financial transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Ok(TransactionType::Income),
            "expense" | "despesa" => Ok(TransactionType::Expense),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

text_enum_sqlx!(TransactionType);

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Role of an authenticated member of an establishment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_synonyms() {
        assert_eq!("agendado".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Scheduled));
        assert_eq!("scheduled".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Scheduled));
        assert_eq!("Realizado".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Completed));
        assert_eq!("confirmado".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Confirmed));
        assert_eq!("in-progress".parse::<AppointmentStatus>(), Ok(AppointmentStatus::InProgress));
        assert_eq!("canceled".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Cancelled));
        assert!("done".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_canonical() {
        let json = serde_json::to_string(&AppointmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: AppointmentStatus = serde_json::from_str("\"realizado\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::Completed);
    }

    #[test]
    fn test_canonical_round_trip() {
        for status in AppointmentStatus::all() {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_vacation_type_parse() {
        assert_eq!("sick_leave".parse::<VacationType>(), Ok(VacationType::SickLeave));
        assert_eq!("folga".parse::<VacationType>(), Ok(VacationType::TimeOff));
        assert!("holiday".parse::<VacationType>().is_err());
    }
}
