use serde::{Deserialize, Serialize};

/// One employee as exchanged with the backend.
///
/// Scores are on a 0-10 scale. `id` is assigned by the backend and absent
/// before creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_name: Option<String>,
    pub surname: String,
    pub revenue: f64,
    pub quality: f64,
    pub discipline: f64,
}

impl Employee {
    /// "Surname First Second", the way the list shows it.
    pub fn full_name(&self) -> String {
        let mut name = format!("{} {}", self.surname, self.first_name);
        if let Some(second) = self.second_name.as_deref().filter(|s| !s.is_empty()) {
            name.push(' ');
            name.push_str(second);
        }
        name
    }

    /// "First Second", used in prompts.
    pub fn short_name(&self) -> String {
        match self.second_name.as_deref().filter(|s| !s.is_empty()) {
            Some(second) => format!("{} {}", self.first_name, second),
            None => self.first_name.clone(),
        }
    }
}

/// Parsed response body together with the HTTP status it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub data: T,
    pub status: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_without_id_before_creation() {
        let employee = Employee {
            id: None,
            first_name: "Anna".into(),
            second_name: None,
            surname: "Ivanova".into(),
            revenue: 7.0,
            quality: 8.5,
            discipline: 9.0,
        };
        let json = serde_json::to_value(&employee).unwrap();

        assert!(json.get("id").is_none());
        assert!(json.get("second_name").is_none());
        assert_eq!(json["surname"], "Ivanova");
    }

    #[test]
    fn full_name_skips_missing_second_name() {
        let employee: Employee = serde_json::from_str(
            r#"{"id": 3, "first_name": "Oleg", "surname": "Petrov", "revenue": 1, "quality": 2, "discipline": 3}"#,
        )
        .unwrap();

        assert_eq!(employee.full_name(), "Petrov Oleg");
        assert_eq!(employee.short_name(), "Oleg");
        assert_eq!(employee.id, Some(3));
    }
}
