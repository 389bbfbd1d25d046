pub mod auth;
pub mod department;
pub mod employee;
pub mod manager;

pub use auth::{AuthOutcome, AuthService};
pub use department::DepartmentService;
pub use employee::EmployeeService;
pub use manager::ManagerService;
