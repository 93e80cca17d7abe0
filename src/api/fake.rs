use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ApiError, Employee, EmployeeApi, Envelope};

/// In-memory backend that records every call it receives.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub employees: Mutex<Vec<Employee>>,
    pub calls: Mutex<Vec<String>>,
    pub delay: Duration,
    pub fail_list: bool,
    pub fail_delete: bool,
    pub fail_create: bool,
}

impl FakeApi {
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees: Mutex::new(employees),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

pub(crate) fn employee(id: i64, surname: &str) -> Employee {
    Employee {
        id: Some(id),
        first_name: format!("First{id}"),
        second_name: Some(format!("Second{id}")),
        surname: surname.to_string(),
        revenue: (id % 10) as f64,
        quality: 5.0,
        discipline: 10.0 - (id % 10) as f64,
    }
}

#[async_trait]
impl EmployeeApi for FakeApi {
    async fn list(&self) -> Result<Envelope<Vec<Employee>>, ApiError> {
        self.record("GET /employees/all".into()).await;
        if self.fail_list {
            return Err(ApiError::Transport("connection refused".into()));
        }
        Ok(Envelope {
            data: self.employees.lock().unwrap().clone(),
            status: 200,
        })
    }

    async fn get(&self, id: i64) -> Result<Envelope<Employee>, ApiError> {
        self.record(format!("GET /employees/get/{id}")).await;
        let found = self
            .employees
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == Some(id))
            .cloned();
        found
            .map(|data| Envelope { data, status: 200 })
            .ok_or_else(|| ApiError::http(404, r#"{"detail": {"message": "not found"}}"#))
    }

    async fn create(&self, employee: &Employee) -> Result<Envelope<serde_json::Value>, ApiError> {
        self.record(format!("POST /employees/create {}", employee.surname))
            .await;
        if self.fail_create {
            return Err(ApiError::http(422, ""));
        }
        let mut employees = self.employees.lock().unwrap();
        let id = employees.iter().filter_map(|e| e.id).max().unwrap_or(0) + 1;
        employees.push(Employee {
            id: Some(id),
            ..employee.clone()
        });
        Ok(Envelope {
            data: serde_json::Value::Null,
            status: 201,
        })
    }

    async fn delete(&self, id: i64) -> Result<Envelope<Employee>, ApiError> {
        self.record(format!("DELETE /employees/delete/{id}")).await;
        if self.fail_delete {
            return Err(ApiError::http(500, ""));
        }
        let mut employees = self.employees.lock().unwrap();
        let position = employees
            .iter()
            .position(|e| e.id == Some(id))
            .ok_or_else(|| ApiError::http(404, ""))?;
        Ok(Envelope {
            data: employees.remove(position),
            status: 200,
        })
    }
}
