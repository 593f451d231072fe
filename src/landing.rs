use crate::{
    models::{Role, Session},
    routes::paths,
};

/// default_landing
///
/// Role-appropriate landing path, used for `/` and after an identity refresh.
/// Without a role the only sensible destination is the login page.
pub fn default_landing(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => paths::ADMIN_TEACHERS,
        Some(Role::Teacher) => paths::TEACHER_SELECT_GRADE,
        Some(Role::Student) => paths::STUDENT_TASKS,
        None => paths::LOGIN,
    }
}

/// student_grades_landing
///
/// Target of the legacy `/student/grades` path: the student's own profile view under
/// their class, or their task list when grade or id is unknown or cannot stand as a
/// single path segment.
pub fn student_grades_landing(session: &Session) -> String {
    match (session.grade.as_deref(), session.user_id.as_deref()) {
        (Some(grade), Some(id)) if is_path_segment(grade) && is_path_segment(id) => {
            format!("/teacher/class/{grade}/student/{id}")
        }
        _ => paths::STUDENT_TASKS.to_string(),
    }
}

fn is_path_segment(value: &str) -> bool {
    !value.trim().is_empty() && !value.contains(['/', '?', '#'])
}
