use portal_guard::{
    landing::{default_landing, student_grades_landing},
    models::{Role, Session},
};

#[test]
fn test_default_landing_per_role() {
    assert_eq!(default_landing(Some(Role::Admin)), "/admin/teachers");
    assert_eq!(default_landing(Some(Role::Teacher)), "/teacher/select-grade");
    assert_eq!(default_landing(Some(Role::Student)), "/student/tasks");
    assert_eq!(default_landing(None), "/login");
}

#[test]
fn test_student_grades_points_to_own_profile() {
    let session = Session {
        grade: Some("5A".to_string()),
        user_id: Some("12".to_string()),
        ..Session::default()
    };
    assert_eq!(student_grades_landing(&session), "/teacher/class/5A/student/12");
}

#[test]
fn test_student_grades_falls_back_to_tasks() {
    let missing_grade = Session {
        user_id: Some("12".to_string()),
        ..Session::default()
    };
    assert_eq!(student_grades_landing(&missing_grade), "/student/tasks");

    let missing_id = Session {
        grade: Some("5A".to_string()),
        ..Session::default()
    };
    assert_eq!(student_grades_landing(&missing_id), "/student/tasks");
}

#[test]
fn test_student_grades_falls_back_when_values_break_the_path() {
    for (grade, id) in [("5/A", "12"), ("5A", "1/2"), ("5?A", "12"), ("5A", "12#x"), (" ", "12")] {
        let session = Session {
            grade: Some(grade.to_string()),
            user_id: Some(id.to_string()),
            ..Session::default()
        };
        assert_eq!(student_grades_landing(&session), "/student/tasks", "{grade:?} {id:?}");
    }
}
