use super::{Page, RouteSpec, RouteTable, paths};
use crate::models::Role;

/// Admin Route Table
///
/// Views exclusively accessible to users with the 'admin' role: teacher verification
/// management and bulk student account generation.
pub fn admin_routes() -> RouteTable {
    RouteTable::new()
        .page(
            paths::ADMIN_TEACHERS,
            RouteSpec::role(Role::Admin, Page::AdminTeachers),
        )
        .page(
            paths::ADMIN_GENERATE_STUDENTS,
            RouteSpec::role(Role::Admin, Page::AdminGenerateStudents),
        )
}
