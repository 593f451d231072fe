use super::{RedirectRule, RouteTable, paths};

/// Redirect Route Table
///
/// Entries that never render a view. They are resolved before the guard runs and carry
/// no access rule of their own; the guard evaluates the target instead.
pub fn redirect_routes() -> RouteTable {
    RouteTable::new()
        // Legacy task list, superseded by the per-class views.
        .redirect(
            paths::TEACHER_TASKS,
            RedirectRule::To(paths::TEACHER_SELECT_GRADE),
        )
        // Bare class path opens the class task list.
        .redirect(
            paths::TEACHER_CLASS,
            RedirectRule::To(paths::TEACHER_CLASS_TASKS),
        )
        .redirect(paths::STUDENT_GRADES, RedirectRule::StudentGrades)
        .redirect(paths::ROOT, RedirectRule::RoleLanding)
}
