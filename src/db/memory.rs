use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DbError, DepartmentRepository, EmployeeRepository, ManagerRepository};
use crate::models::department::{Department, DepartmentFilter};
use crate::models::employee::{Employee, EmployeeFilter, EmployeeUpdate, NewEmployee};
use crate::models::manager::{Manager, ProfileChanges};

/// Volatile store with the same ownership semantics as the PostgreSQL
/// repositories. Used by the test-suite and for running without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    managers: Vec<Manager>,
    departments: Vec<Department>,
    employees: Vec<Employee>,
}

impl Tables {
    fn owns_department(&self, owner: Uuid, department_id: Uuid) -> bool {
        self.departments
            .iter()
            .any(|d| d.department_id == department_id && d.manager_id == owner)
    }

    fn owned_employee_index(&self, owner: Uuid, identity_number: &str) -> Option<usize> {
        self.employees.iter().position(|e| {
            e.identity_number == identity_number
                && e.deleted_at.is_none()
                && self.owns_department(owner, e.department_id)
        })
    }

    fn identity_number_taken(&self, identity_number: &str, except: Option<Uuid>) -> bool {
        self.employees.iter().any(|e| {
            e.identity_number == identity_number
                && e.deleted_at.is_none()
                && Some(e.employee_id) != except
        })
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.managers
            .iter()
            .any(|m| same_email(&m.email, email) && Some(m.manager_id) != except)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(rows: Vec<&T>, limit: i64, offset: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

fn same_email(stored: &str, candidate: &str) -> bool {
    stored.to_lowercase() == candidate.to_lowercase()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl ManagerRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Manager>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .managers
            .iter()
            .find(|m| same_email(&m.email, email) && m.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_id(&self, manager_id: Uuid) -> Result<Option<Manager>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .managers
            .iter()
            .find(|m| m.manager_id == manager_id && m.deleted_at.is_none())
            .cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<Manager, DbError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(email, None) {
            return Err(DbError::UniqueViolation("managers_email_key".to_string()));
        }

        let now = Utc::now();
        let manager = Manager {
            manager_id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: None,
            user_image_uri: None,
            company_name: None,
            company_image_uri: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.managers.push(manager.clone());
        Ok(manager)
    }

    async fn update_profile(
        &self,
        manager_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<Manager>, DbError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(manager_id)) {
                return Err(DbError::UniqueViolation("managers_email_key".to_string()));
            }
        }

        let Some(manager) = tables
            .managers
            .iter_mut()
            .find(|m| m.manager_id == manager_id && m.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(email) = changes.email {
            manager.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            manager.password_hash = password_hash;
        }
        if changes.name.is_some() {
            manager.name = changes.name;
        }
        if changes.user_image_uri.is_some() {
            manager.user_image_uri = changes.user_image_uri;
        }
        if changes.company_name.is_some() {
            manager.company_name = changes.company_name;
        }
        if changes.company_image_uri.is_some() {
            manager.company_image_uri = changes.company_image_uri;
        }
        manager.updated_at = Utc::now();
        Ok(Some(manager.clone()))
    }
}

#[async_trait]
impl DepartmentRepository for MemoryStore {
    async fn create(&self, owner: Uuid, name: &str) -> Result<Department, DbError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let department = Department {
            department_id: Uuid::new_v4(),
            name: name.to_string(),
            manager_id: owner,
            created_at: now,
            updated_at: now,
        };
        tables.departments.push(department.clone());
        Ok(department)
    }

    async fn list(&self, owner: Uuid, filter: &DepartmentFilter) -> Result<Vec<Department>, DbError> {
        let tables = self.tables.read().await;
        // Newest first: rows are appended in creation order.
        let rows = tables
            .departments
            .iter()
            .rev()
            .filter(|d| d.manager_id == owner)
            .filter(|d| match &filter.name {
                Some(name) => contains_ignore_case(&d.name, name),
                None => true,
            })
            .collect();
        Ok(page(rows, filter.limit, filter.offset))
    }

    async fn find_owned(&self, owner: Uuid, department_id: Uuid) -> Result<Option<Department>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .departments
            .iter()
            .find(|d| d.department_id == department_id && d.manager_id == owner)
            .cloned())
    }

    async fn update(
        &self,
        owner: Uuid,
        department_id: Uuid,
        name: &str,
    ) -> Result<Option<Department>, DbError> {
        let mut tables = self.tables.write().await;
        let Some(department) = tables
            .departments
            .iter_mut()
            .find(|d| d.department_id == department_id && d.manager_id == owner)
        else {
            return Ok(None);
        };
        department.name = name.to_string();
        department.updated_at = Utc::now();
        Ok(Some(department.clone()))
    }

    async fn has_active_employees(&self, owner: Uuid, department_id: Uuid) -> Result<bool, DbError> {
        let tables = self.tables.read().await;
        if !tables.owns_department(owner, department_id) {
            return Ok(false);
        }
        Ok(tables
            .employees
            .iter()
            .any(|e| e.department_id == department_id && e.deleted_at.is_none()))
    }

    async fn delete(&self, owner: Uuid, department_id: Uuid) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        let before = tables.departments.len();
        tables
            .departments
            .retain(|d| !(d.department_id == department_id && d.manager_id == owner));
        let deleted = tables.departments.len() < before;
        if deleted {
            tables.employees.retain(|e| e.department_id != department_id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn list(&self, owner: Uuid, filter: &EmployeeFilter) -> Result<Vec<Employee>, DbError> {
        let tables = self.tables.read().await;
        let rows = tables
            .employees
            .iter()
            .rev()
            .filter(|e| e.deleted_at.is_none() && tables.owns_department(owner, e.department_id))
            .filter(|e| match &filter.identity_number {
                Some(prefix) => e.identity_number.starts_with(prefix.as_str()),
                None => true,
            })
            .filter(|e| match &filter.name {
                Some(name) => contains_ignore_case(&e.name, name),
                None => true,
            })
            .filter(|e| match filter.gender {
                Some(gender) => e.gender == gender.as_str(),
                None => true,
            })
            .filter(|e| match filter.department_id {
                Some(department_id) => e.department_id == department_id,
                None => true,
            })
            .collect();
        Ok(page(rows, filter.limit, filter.offset))
    }

    async fn create(&self, owner: Uuid, employee: &NewEmployee) -> Result<Option<Employee>, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.owns_department(owner, employee.department_id) {
            return Ok(None);
        }
        if tables.identity_number_taken(&employee.identity_number, None) {
            return Err(DbError::UniqueViolation("employees_identity_number_active".to_string()));
        }

        let now = Utc::now();
        let created = Employee {
            employee_id: Uuid::new_v4(),
            identity_number: employee.identity_number.clone(),
            name: employee.name.clone(),
            employee_image_uri: employee.employee_image_uri.clone(),
            gender: employee.gender.as_str().to_string(),
            department_id: employee.department_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.employees.push(created.clone());
        Ok(Some(created))
    }

    async fn find_owned(&self, owner: Uuid, identity_number: &str) -> Result<Option<Employee>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .owned_employee_index(owner, identity_number)
            .map(|idx| tables.employees[idx].clone()))
    }

    async fn update(
        &self,
        owner: Uuid,
        identity_number: &str,
        changes: &EmployeeUpdate,
    ) -> Result<Option<Employee>, DbError> {
        let mut tables = self.tables.write().await;
        let Some(idx) = tables.owned_employee_index(owner, identity_number) else {
            return Ok(None);
        };

        let employee_id = tables.employees[idx].employee_id;
        if let Some(new_identity) = &changes.identity_number {
            if tables.identity_number_taken(new_identity, Some(employee_id)) {
                return Err(DbError::UniqueViolation("employees_identity_number_active".to_string()));
            }
        }

        let employee = &mut tables.employees[idx];
        if let Some(identity_number) = &changes.identity_number {
            employee.identity_number = identity_number.clone();
        }
        if let Some(name) = &changes.name {
            employee.name = name.clone();
        }
        if let Some(employee_image_uri) = &changes.employee_image_uri {
            employee.employee_image_uri = employee_image_uri.clone();
        }
        if let Some(gender) = changes.gender {
            employee.gender = gender.as_str().to_string();
        }
        if let Some(department_id) = changes.department_id {
            employee.department_id = department_id;
        }
        employee.updated_at = Utc::now();
        Ok(Some(employee.clone()))
    }

    async fn soft_delete(&self, owner: Uuid, identity_number: &str) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        let Some(idx) = tables.owned_employee_index(owner, identity_number) else {
            return Ok(false);
        };
        let now = Utc::now();
        let employee = &mut tables.employees[idx];
        employee.deleted_at = Some(now);
        employee.updated_at = now;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::Gender;

    fn all_departments() -> DepartmentFilter {
        DepartmentFilter {
            name: None,
            limit: 100,
            offset: 0,
        }
    }

    fn all_employees() -> EmployeeFilter {
        EmployeeFilter {
            identity_number: None,
            name: None,
            gender: None,
            department_id: None,
            limit: 100,
            offset: 0,
        }
    }

    fn new_employee(identity_number: &str, department_id: Uuid) -> NewEmployee {
        NewEmployee {
            identity_number: identity_number.to_string(),
            name: "Budi Santoso".to_string(),
            employee_image_uri: "https://cdn.example.com/budi.png".to_string(),
            gender: Gender::Male,
            department_id,
        }
    }

    #[actix_web::test]
    async fn department_listing_is_owner_scoped() {
        let store = MemoryStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        DepartmentRepository::create(&store, alice, "Engineering").await.unwrap();
        DepartmentRepository::create(&store, bob, "Finance").await.unwrap();

        let listed = DepartmentRepository::list(&store, alice, &all_departments()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Engineering");
    }

    #[actix_web::test]
    async fn department_listing_pages_newest_first() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for name in ["First", "Second", "Third"] {
            DepartmentRepository::create(&store, owner, name).await.unwrap();
        }

        let filter = DepartmentFilter {
            name: None,
            limit: 2,
            offset: 1,
        };
        let names: Vec<String> = DepartmentRepository::list(&store, owner, &filter)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[actix_web::test]
    async fn foreign_department_cannot_be_touched() {
        let store = MemoryStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let dept = DepartmentRepository::create(&store, alice, "Engineering").await.unwrap();

        assert!(DepartmentRepository::update(&store, bob, dept.department_id, "Hijacked")
            .await
            .unwrap()
            .is_none());
        assert!(!DepartmentRepository::delete(&store, bob, dept.department_id).await.unwrap());
        assert_eq!(
            DepartmentRepository::find_owned(&store, alice, dept.department_id)
                .await
                .unwrap()
                .unwrap()
                .name,
            "Engineering"
        );
    }

    #[actix_web::test]
    async fn employee_creation_requires_owned_department() {
        let store = MemoryStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let dept = DepartmentRepository::create(&store, alice, "Engineering").await.unwrap();

        let created = EmployeeRepository::create(&store, bob, &new_employee("1234567", dept.department_id))
            .await
            .unwrap();
        assert!(created.is_none());

        let created = EmployeeRepository::create(&store, alice, &new_employee("1234567", dept.department_id))
            .await
            .unwrap();
        assert!(created.is_some());
        assert!(EmployeeRepository::list(&store, bob, &all_employees()).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn identity_numbers_are_unique_among_live_employees() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let dept = DepartmentRepository::create(&store, owner, "Engineering").await.unwrap();
        let employee = new_employee("1234567", dept.department_id);

        EmployeeRepository::create(&store, owner, &employee).await.unwrap();
        assert!(matches!(
            EmployeeRepository::create(&store, owner, &employee).await,
            Err(DbError::UniqueViolation(_))
        ));

        assert!(EmployeeRepository::soft_delete(&store, owner, "1234567").await.unwrap());
        assert!(EmployeeRepository::create(&store, owner, &employee).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn soft_deleted_employees_disappear() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let dept = DepartmentRepository::create(&store, owner, "Engineering").await.unwrap();
        EmployeeRepository::create(&store, owner, &new_employee("1234567", dept.department_id))
            .await
            .unwrap();

        assert!(EmployeeRepository::soft_delete(&store, owner, "1234567").await.unwrap());
        assert!(!EmployeeRepository::soft_delete(&store, owner, "1234567").await.unwrap());
        assert!(EmployeeRepository::find_owned(&store, owner, "1234567").await.unwrap().is_none());
        assert!(!DepartmentRepository::has_active_employees(&store, owner, dept.department_id)
            .await
            .unwrap());
    }

    #[actix_web::test]
    async fn email_is_unique_case_insensitively() {
        let store = MemoryStore::new();
        ManagerRepository::create(&store, "a@b.com", "hash").await.unwrap();
        assert!(matches!(
            ManagerRepository::create(&store, "A@B.com", "hash").await,
            Err(DbError::UniqueViolation(_))
        ));
        assert!(ManagerRepository::find_by_email(&store, "A@b.COM").await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn email_case_folding_covers_non_ascii() {
        let store = MemoryStore::new();
        ManagerRepository::create(&store, "ÄNNE@b.com", "hash").await.unwrap();
        assert!(matches!(
            ManagerRepository::create(&store, "änne@b.com", "hash").await,
            Err(DbError::UniqueViolation(_))
        ));
        assert!(ManagerRepository::find_by_email(&store, "Änne@B.com").await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn wildcard_characters_in_filters_match_literally() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let dept = DepartmentRepository::create(&store, owner, "R&D 100%").await.unwrap();
        DepartmentRepository::create(&store, owner, "R&D 1000").await.unwrap();
        EmployeeRepository::create(&store, owner, &new_employee("12345", dept.department_id))
            .await
            .unwrap();

        let by_name = DepartmentFilter {
            name: Some("100%".into()),
            ..all_departments()
        };
        let listed = DepartmentRepository::list(&store, owner, &by_name).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "R&D 100%");

        let by_prefix = EmployeeFilter {
            identity_number: Some("1_3".into()),
            ..all_employees()
        };
        assert!(EmployeeRepository::list(&store, owner, &by_prefix).await.unwrap().is_empty());
    }
}
