#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::System),
            5 => Some(Role::ApiUser),
            _ => None,
        }
    }

    /// Roles allowed to run HR operations (approvals, payroll, reports).
    pub fn can_manage_hr(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for id in 1..=5u8 {
            assert_eq!(Role::from_id(id).unwrap() as u8, id);
        }
        assert!(Role::from_id(0).is_none());
        assert!(Role::from_id(6).is_none());
    }

    #[test]
    fn hr_management_is_admin_or_hr() {
        assert!(Role::Admin.can_manage_hr());
        assert!(Role::Hr.can_manage_hr());
        assert!(!Role::Employee.can_manage_hr());
        assert!(!Role::ApiUser.can_manage_hr());
    }
}
