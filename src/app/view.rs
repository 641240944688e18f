use iced::Length;
use iced::widget::{Container, Row};
use crate::router::View;
use crate::screens::{
    attendance_screen, change_password_screen, classes_screen, dashboard_screen, home_screen,
    magazine_admin_screen, magazines_screen, nav_menu, rankings_screen, reports_screen,
    settings_screen, students_screen, users_screen,
};
use super::{App, Message};

impl App {
    pub fn view(&self) -> Row<Message> {
        let view = self.effective_view();
        if view == View::Home {
            return Row::new().push(home_screen(self).width(Length::Fill));
        }

        Row::new()
            .spacing(20)
            .push(
                Container::new(nav_menu(self, view))
                    .width(Length::Fixed(220.0))
                    .height(Length::Fill)
                    .padding(10),
            )
            .push(
                match view {
                    View::Home => home_screen(self),
                    View::Dashboard => dashboard_screen(self),
                    View::Attendance => attendance_screen(self),
                    View::Reports => reports_screen(self),
                    View::Rankings => rankings_screen(self),
                    View::Students => students_screen(self),
                    View::Classes => classes_screen(self),
                    View::Users => users_screen(self),
                    View::Magazines => magazines_screen(self),
                    View::MagazineAdmin => magazine_admin_screen(self),
                    View::ChangePassword => change_password_screen(self),
                    View::Settings => settings_screen(self),
                }
                .width(Length::Fill),
            )
    }
}
