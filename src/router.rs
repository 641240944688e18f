//! View gate: decides which screen is rendered for a requested view.

use std::fmt;
use crate::api::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Home,
    Dashboard,
    Attendance,
    Reports,
    Rankings,
    Students,
    Classes,
    Users,
    Magazines,
    MagazineAdmin,
    ChangePassword,
    Settings,
}

impl View {
    #[cfg(test)]
    pub const ALL: &'static [View] = &[
        View::Home,
        View::Dashboard,
        View::Attendance,
        View::Reports,
        View::Rankings,
        View::Students,
        View::Classes,
        View::Users,
        View::Magazines,
        View::MagazineAdmin,
        View::ChangePassword,
        View::Settings,
    ];

    /// Views only admins and moderators may open.
    pub fn requires_admin(self) -> bool {
        matches!(
            self,
            View::Reports
                | View::Rankings
                | View::Students
                | View::Classes
                | View::Users
                | View::MagazineAdmin
        )
    }

    /// Parses a symbolic view name. The legacy Portuguese names are accepted
    /// alongside the English ones. Navigation is typed, so only tests go
    /// through names.
    #[cfg(test)]
    pub fn from_name(name: &str) -> Option<View> {
        let view = match name {
            "home" => View::Home,
            "dashboard" => View::Dashboard,
            "attendance" | "chamada" => View::Attendance,
            "reports" | "relatorios" => View::Reports,
            "rankings" | "ranking" => View::Rankings,
            "students" | "alunos" => View::Students,
            "classes" | "turmas" => View::Classes,
            "users" | "usuarios" => View::Users,
            "magazines" | "revistas" => View::Magazines,
            "magazine-admin" | "admin-revistas" => View::MagazineAdmin,
            "change-password" | "alterar-senha" => View::ChangePassword,
            "settings" => View::Settings,
            _ => return None,
        };
        Some(view)
    }

    pub fn name(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Dashboard => "dashboard",
            View::Attendance => "attendance",
            View::Reports => "reports",
            View::Rankings => "rankings",
            View::Students => "students",
            View::Classes => "classes",
            View::Users => "users",
            View::Magazines => "magazines",
            View::MagazineAdmin => "magazine-admin",
            View::ChangePassword => "change-password",
            View::Settings => "settings",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl View {
    /// Label used in the navigation menu and screen headers.
    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Início",
            View::Dashboard => "Painel",
            View::Attendance => "Chamada",
            View::Reports => "Relatórios",
            View::Rankings => "Rankings",
            View::Students => "Alunos",
            View::Classes => "Turmas",
            View::Users => "Usuários",
            View::Magazines => "Revistas",
            View::MagazineAdmin => "Gerenciar revistas",
            View::ChangePassword => "Alterar senha",
            View::Settings => "Configurações",
        }
    }
}

/// The view actually rendered for `requested`. Pure: the answer depends on
/// the arguments only, and nothing is mutated along the way.
pub fn resolve_view(requested: View, authenticated: bool, role: Option<Role>) -> View {
    if !authenticated {
        return View::Home;
    }
    if requested.requires_admin() && !role.is_some_and(Role::is_admin) {
        return View::Dashboard;
    }
    requested
}

/// Same as [`resolve_view`] for a symbolic name; unknown names render home.
#[cfg(test)]
pub fn resolve_view_name(name: &str, authenticated: bool, role: Option<Role>) -> View {
    match View::from_name(name) {
        Some(view) => resolve_view(view, authenticated, role),
        None => View::Home,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [Option<Role>; 4] = [None, Some(Role::Admin), Some(Role::Moderator), Some(Role::Teacher)];

    #[test]
    fn unauthenticated_always_lands_home() {
        for &view in View::ALL {
            for role in ROLES {
                assert_eq!(resolve_view(view, false, role), View::Home, "{view:?} {role:?}");
            }
        }
    }

    #[test]
    fn shared_views_render_for_any_role() {
        for view in [
            View::Dashboard,
            View::Attendance,
            View::Magazines,
            View::ChangePassword,
            View::Settings,
        ] {
            assert_eq!(resolve_view(view, true, Some(Role::Teacher)), view);
            assert_eq!(resolve_view(view, true, Some(Role::Admin)), view);
        }
    }

    #[test]
    fn admin_views_downgrade_to_dashboard_for_teachers() {
        for &view in View::ALL.iter().filter(|v| v.requires_admin()) {
            assert_eq!(resolve_view(view, true, Some(Role::Teacher)), View::Dashboard);
            assert_eq!(resolve_view(view, true, None), View::Dashboard);
            assert_eq!(resolve_view(view, true, Some(Role::Admin)), view);
            assert_eq!(resolve_view(view, true, Some(Role::Moderator)), view);
        }
    }

    #[test]
    fn resolution_does_not_depend_on_call_history() {
        let first = resolve_view(View::Users, true, Some(Role::Teacher));
        let _ = resolve_view(View::Users, false, None);
        let _ = resolve_view(View::Users, true, Some(Role::Admin));
        assert_eq!(resolve_view(View::Users, true, Some(Role::Teacher)), first);
    }

    #[test]
    fn names_resolve_including_legacy_ones() {
        assert_eq!(resolve_view_name("chamada", true, Some(Role::Teacher)), View::Attendance);
        assert_eq!(resolve_view_name("relatorios", true, Some(Role::Admin)), View::Reports);
        assert_eq!(resolve_view_name("usuarios", true, Some(Role::Teacher)), View::Dashboard);
        assert_eq!(resolve_view_name("revistas", true, Some(Role::Teacher)), View::Magazines);
        assert_eq!(resolve_view_name("admin-revistas", true, Some(Role::Teacher)), View::Dashboard);
        assert_eq!(resolve_view_name("admin-revistas", true, Some(Role::Admin)), View::MagazineAdmin);
        assert_eq!(resolve_view_name("logs", true, Some(Role::Admin)), View::Home);
        assert_eq!(resolve_view_name("", true, Some(Role::Admin)), View::Home);

        for &view in View::ALL {
            assert_eq!(View::from_name(view.name()), Some(view));
        }
    }
}
