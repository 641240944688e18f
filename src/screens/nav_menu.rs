use iced::{widget::{button, column, text, vertical_space, Button, Column, Container}, Length};
use iced_font_awesome::fa_icon_solid;
use crate::app::{App, Message};
use crate::router::View;
use super::common::icon_button_content;

const MAIN_ENTRIES: &[(View, &str)] = &[
    (View::Dashboard, "chart-line"),
    (View::Attendance, "clipboard-check"),
    (View::Magazines, "book-open"),
    (View::Reports, "file-lines"),
    (View::Rankings, "trophy"),
    (View::Students, "user-graduate"),
    (View::Classes, "chalkboard"),
    (View::Users, "users"),
];

fn nav_button<'a>(app: &'a App, view: View, icon: &'a str, current: View) -> Button<'a, Message> {
    button(icon_button_content(
        fa_icon_solid(icon).style(move |_| text::base(&app.theme)),
        view.title(),
    ))
    .style(if view == current { button::primary } else { button::secondary })
    .on_press(Message::Navigate(view))
    .width(Length::Fill)
}

/// Sidebar; administrative entries are only listed for admins and moderators.
pub fn nav_menu(app: &App, current: View) -> Container<Message> {
    let is_admin = app.session.role().is_some_and(|r| r.is_admin());

    let mut content = Column::new().spacing(10);
    if let Some(session) = app.session.current() {
        content = content.push(
            column![
                text(&session.user.name).size(18),
                text(session.user.role.to_string()).size(14),
            ]
            .spacing(2),
        );
    }

    for &(view, icon) in MAIN_ENTRIES {
        if view.requires_admin() && !is_admin {
            continue;
        }
        content = content.push(nav_button(app, view, icon, current));
    }

    content = content
        .push(vertical_space())
        .push(nav_button(app, View::ChangePassword, "key", current))
        .push(nav_button(app, View::Settings, "gear", current))
        .push(
            button(icon_button_content(
                fa_icon_solid("arrow-right-from-bracket").style(move |_| text::base(&app.theme)),
                "Sair",
            ))
            .on_press(Message::Logout)
            .width(Length::Fill),
        );

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(10)
}
