use iced::{widget::{button, column, text, text_input, Container, Space}, Center, Length};
use crate::app::{App, Message};
use super::common::ERROR_COLOR;

/// Login form; the only screen reachable without a session.
pub fn home_screen(app: &App) -> Container<Message> {
    let mut content = column![
        text("EBD Manager").size(34),
        text("Escola Bíblica Dominical").size(18),
        Space::with_height(20),
        text_input("Email", &app.login_email)
            .on_input(Message::LoginEmailChanged)
            .on_submit(Message::LoginPressed)
            .padding(10)
            .size(18)
            .width(Length::Fixed(350.0)),
        text_input("Senha", &app.login_password)
            .secure(true)
            .on_input(Message::LoginPasswordChanged)
            .on_submit(Message::LoginPressed)
            .padding(10)
            .size(18)
            .width(Length::Fixed(350.0)),
        button(if app.logging_in { "Entrando..." } else { "Entrar" })
            .on_press_maybe((!app.logging_in).then_some(Message::LoginPressed))
            .padding(10),
    ]
    .spacing(15)
    .width(Length::Fill)
    .align_x(Center);

    if let Some(error) = &app.login_error {
        content = content.push(text(error).size(18).color(ERROR_COLOR));
    }

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(40)
        .center_y(Length::Fill)
}
