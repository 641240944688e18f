use iced::{widget::{button, column, text, text_input, Container}, Center, Length};
use crate::app::{App, Message};
use crate::forms::MIN_PASSWORD_LEN;
use super::common::{notice, title};

pub fn change_password_screen(app: &App) -> Container<Message> {
    let form = &app.password_form;
    let mut content = column![
        title("Alterar senha"),
        text_input("Senha atual", &form.current)
            .secure(true)
            .on_input(Message::CurrentPasswordChanged)
            .padding(10)
            .width(Length::Fixed(350.0)),
        text_input(&format!("Nova senha (mínimo {MIN_PASSWORD_LEN} caracteres)"), &form.new)
            .secure(true)
            .on_input(Message::NewPasswordChanged)
            .padding(10)
            .width(Length::Fixed(350.0)),
        text_input("Confirmar nova senha", &form.confirm)
            .secure(true)
            .on_input(Message::ConfirmPasswordChanged)
            .on_submit(Message::SubmitPasswordChange)
            .padding(10)
            .width(Length::Fixed(350.0)),
        button("Alterar senha")
            .on_press(Message::SubmitPasswordChange)
            .padding(10),
    ]
    .spacing(15)
    .width(Length::Fill)
    .align_x(Center);

    if let Some(line) = notice(app) {
        content = content.push(line);
    }
    content = content.push(
        text(format!("Use pelo menos {MIN_PASSWORD_LEN} caracteres e não reutilize a senha atual."))
            .size(14),
    );

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(40)
}
