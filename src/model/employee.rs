use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::calc::payroll::{AllowanceItem, Allowances};

/// Employee master record. Salary is kept as a basic/gross pair and the
/// allowance slots are flag+amount pairs so an allowance can be configured
/// but switched off. Deletes are soft: `is_deleted` rows stay for payroll
/// history but never appear in listings.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "Ayesha",
        "last_name": "Khan",
        "email": "ayesha.khan@company.com",
        "phone": "+923001234567",
        "department_id": 10,
        "job_title_id": 3,
        "hire_date": "2023-11-01",
        "status": "Active",
        "salary_basic": 253308.0,
        "salary_gross": 380000.0
    })
)]
pub struct Employee {
    pub id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[schema(nullable = true)]
    pub phone: Option<String>,
    pub department_id: u64,
    pub job_title_id: u64,
    #[schema(value_type = String, format = "date")]
    pub hire_date: NaiveDate,
    pub status: String,

    pub salary_basic: f64,
    pub salary_gross: f64,

    pub conveyance_active: bool,
    pub conveyance_amount: f64,
    pub food_active: bool,
    pub food_amount: f64,
    pub vehicle_fuel_active: bool,
    pub vehicle_fuel_amount: f64,
    pub medical_active: bool,
    pub medical_amount: f64,
    pub house_rent_active: bool,
    pub house_rent_amount: f64,
    pub special_active: bool,
    pub special_amount: f64,
    pub other_active: bool,
    pub other_amount: f64,

    pub is_deleted: bool,
}

impl Employee {
    /// Assemble the allowance columns into the calculation core's shape.
    pub fn allowances(&self) -> Allowances {
        let item = |active: bool, amount: f64| AllowanceItem {
            is_active: active,
            amount,
        };
        Allowances {
            conveyance: item(self.conveyance_active, self.conveyance_amount),
            food: item(self.food_active, self.food_amount),
            vehicle_fuel: item(self.vehicle_fuel_active, self.vehicle_fuel_amount),
            medical: item(self.medical_active, self.medical_amount),
            house_rent: item(self.house_rent_active, self.house_rent_amount),
            special: item(self.special_active, self.special_amount),
            other: item(self.other_active, self.other_amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> Employee {
        Employee {
            id: 1,
            employee_code: "EMP-001".into(),
            first_name: "Ayesha".into(),
            last_name: "Khan".into(),
            email: "a@b.pk".into(),
            phone: None,
            department_id: 1,
            job_title_id: 1,
            hire_date: NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
            status: "Active".into(),
            salary_basic: 253_308.0,
            salary_gross: 380_000.0,
            conveyance_active: false,
            conveyance_amount: 10_000.0,
            food_active: false,
            food_amount: 0.0,
            vehicle_fuel_active: true,
            vehicle_fuel_amount: 35_000.0,
            medical_active: false,
            medical_amount: 0.0,
            house_rent_active: false,
            house_rent_amount: 0.0,
            special_active: false,
            special_amount: 0.0,
            other_active: false,
            other_amount: 0.0,
            is_deleted: false,
        }
    }

    #[test]
    fn only_active_allowances_pay_out() {
        assert_eq!(employee().allowances().active_total(), 35_000.0);
    }
}
