use std::fmt;

use tracing::{debug, trace};

/// Screens of the application. Unknown paths resolve to [`Route::Home`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Departments,
    Employees,
    EditEmployee(i64),
    CreateEmployee,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Route::Home,
            ["departments"] => Route::Departments,
            ["employees"] => Route::Employees,
            ["employees", "create"] => Route::CreateEmployee,
            ["employees", "edit", id] => match id.parse() {
                Ok(id) => Route::EditEmployee(id),
                Err(_) => Route::Home,
            },
            _ => Route::Home,
        };
        trace!("Route \"{path}\" => {route:?}");
        route
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Departments => "/departments".to_string(),
            Route::Employees => "/employees".to_string(),
            Route::EditEmployee(id) => format!("/employees/edit/{id}"),
            Route::CreateEmployee => "/employees/create".to_string(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Departments => "Departments",
            Route::Employees => "Employees",
            Route::EditEmployee(_) => "Employee",
            Route::CreateEmployee => "New employee",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Current route plus the way back.
#[derive(Debug)]
pub struct Router {
    current: Route,
    history: Vec<Route>,
}

impl Router {
    pub fn new(initial: Route) -> Self {
        Self {
            current: initial,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Pushes `route`. Returns the route that was left, `None` when already there.
    pub fn navigate(&mut self, route: Route) -> Option<Route> {
        if route == self.current {
            return None;
        }
        debug!("Navigate {} -> {}", self.current, route);
        let previous = std::mem::replace(&mut self.current, route);
        self.history.push(previous.clone());
        Some(previous)
    }

    /// Swaps the current route without growing the history. A history entry
    /// equal to `route` on top is dropped so back does not land on it again.
    pub fn replace(&mut self, route: Route) -> Route {
        debug!("Replace {} -> {}", self.current, route);
        if self.history.last() == Some(&route) {
            self.history.pop();
        }
        std::mem::replace(&mut self.current, route)
    }

    /// Returns the route that was left.
    pub fn back(&mut self) -> Option<Route> {
        let target = self.history.pop()?;
        debug!("Back {} -> {}", self.current, target);
        Some(std::mem::replace(&mut self.current, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/departments"), Route::Departments);
        assert_eq!(Route::parse("/employees/"), Route::Employees);
        assert_eq!(Route::parse("/employees/edit/42"), Route::EditEmployee(42));
        assert_eq!(Route::parse("/employees/create"), Route::CreateEmployee);
    }

    #[test]
    fn unknown_paths_redirect_home() {
        assert_eq!(Route::parse("/payroll"), Route::Home);
        assert_eq!(Route::parse("/employees/edit/abc"), Route::Home);
        assert_eq!(Route::parse("/employees/edit"), Route::Home);
    }

    #[test]
    fn path_round_trips() {
        for route in [Route::Home, Route::Employees, Route::EditEmployee(7), Route::CreateEmployee] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn history() {
        let mut router = Router::new(Route::Home);
        assert_eq!(router.navigate(Route::Employees), Some(Route::Home));
        assert_eq!(router.navigate(Route::Employees), None);
        router.navigate(Route::EditEmployee(3));

        assert_eq!(router.back(), Some(Route::EditEmployee(3)));
        assert_eq!(router.current(), &Route::Employees);
        assert_eq!(router.back(), Some(Route::Employees));
        assert_eq!(router.back(), None);
        assert_eq!(router.current(), &Route::Home);
    }

    #[test]
    fn replace_skips_duplicate_history() {
        let mut router = Router::new(Route::Home);
        router.navigate(Route::Employees);
        router.navigate(Route::CreateEmployee);

        assert_eq!(router.replace(Route::Employees), Route::CreateEmployee);
        assert_eq!(router.back(), Some(Route::Employees));
        assert_eq!(router.current(), &Route::Home);
    }
}
