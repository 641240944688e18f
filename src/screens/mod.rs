pub mod common;
pub mod home;
pub mod nav_menu;
pub mod dashboard;
pub mod attendance;
pub mod reports;
pub mod rankings;
pub mod students;
pub mod classes;
pub mod users;
pub mod magazines;
pub mod magazine_admin;
pub mod change_password;
pub mod settings;

pub use home::home_screen;
pub use nav_menu::nav_menu;
pub use dashboard::dashboard_screen;
pub use attendance::attendance_screen;
pub use reports::reports_screen;
pub use rankings::rankings_screen;
pub use students::students_screen;
pub use classes::classes_screen;
pub use users::users_screen;
pub use magazines::magazines_screen;
pub use magazine_admin::magazine_admin_screen;
pub use change_password::change_password_screen;
pub use settings::settings_screen;
