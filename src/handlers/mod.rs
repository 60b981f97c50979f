pub mod admin_handler;
pub mod auth_handler;
pub mod health_handler;
pub mod quiz_handler;

pub use admin_handler::{
    add_question, delete_question, get_admin_session_report, get_all_sessions, get_all_students,
    get_dashboard_overview, get_level_stats, get_question_stats, get_student_details,
    get_top_performers, update_question,
};
pub use auth_handler::{
    admin_login, get_profile, register_admin, sso_login, student_login, update_profile,
};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use quiz_handler::{
    complete_session, get_history, get_questions_by_level, get_session_report, get_student_stats,
    start_session, submit_answer,
};
