use super::{Page, RouteSpec, RouteTable, paths};
use crate::models::Role;

/// Student Route Table
pub fn student_routes() -> RouteTable {
    RouteTable::new().page(
        paths::STUDENT_TASKS,
        RouteSpec::role(Role::Student, Page::StudentTasks),
    )
}
