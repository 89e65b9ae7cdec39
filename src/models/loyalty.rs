//! Loyalty programs and client point balances

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoyaltyProgram {
    pub id: i32,
    pub establishment_id: i32,
    pub name: String,
    pub points_per_service: i32,
    /// Services that earn points under this program
    pub eligible_service_ids: Vec<i32>,
    pub is_active: bool,
}

impl LoyaltyProgram {
    pub fn rewards(&self, service_id: i32) -> bool {
        self.is_active && self.points_per_service > 0 && self.eligible_service_ids.contains(&service_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClientLoyaltyPoints {
    pub id: i32,
    pub client_id: i32,
    pub program_id: i32,
    pub points: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(active: bool, points: i32, services: Vec<i32>) -> LoyaltyProgram {
        LoyaltyProgram {
            id: 1,
            establishment_id: 1,
            name: "Clube".to_string(),
            points_per_service: points,
            eligible_service_ids: services,
            is_active: active,
        }
    }

    #[test]
    fn test_rewards_only_eligible_services() {
        let p = program(true, 10, vec![3, 4]);
        assert!(p.rewards(3));
        assert!(!p.rewards(5));
    }

    #[test]
    fn test_inactive_or_pointless_program_rewards_nothing() {
        assert!(!program(false, 10, vec![3]).rewards(3));
        assert!(!program(true, 0, vec![3]).rewards(3));
    }
}
