use iced::{Alignment, Length};
use iced::widget::container::bordered_box;
use iced::widget::{Button, Column, Container, PickList, Row, Scrollable, Text, TextInput, checkbox, horizontal_space};
use crate::api::models::Role;
use crate::app::state::DeleteTarget;
use crate::app::{App, Message};
use super::common::{modal, notice, title, with_delete_confirmation};

pub fn users_screen(app: &App) -> Container<Message> {
    let mut list = Column::new().spacing(15);

    for user in &app.users {
        let classes = if user.tipo.is_admin() {
            "todas".to_string()
        } else if user.turmas_permitidas.is_empty() {
            "nenhuma".to_string()
        } else {
            user.turmas_permitidas
                .iter()
                .map(|id| app.turma_name(id))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut info = Column::new()
            .spacing(5)
            .push(Text::new(&user.nome).size(18))
            .push(Text::new(format!("Email: {}", user.email)))
            .push(Text::new(format!("Tipo: {}", user.tipo)))
            .push(Text::new(format!("Turmas: {classes}")));
        if !user.ativo {
            info = info.push(Text::new("Inativo").size(14));
        }

        let header = Row::new()
            .push(Button::new(Text::new("Editar")).on_press(Message::EditUser(user.clone())))
            .push(horizontal_space())
            .push(
                Button::new(Text::new("X"))
                    .style(iced::widget::button::danger)
                    .on_press(Message::RequestDelete(DeleteTarget::User {
                        id: user.id.clone(),
                        name: user.nome.clone(),
                    })),
            )
            .width(Length::Fill);

        list = list.push(
            Container::new(
                Column::new()
                    .push(Container::new(header).style(move |_| bordered_box(&app.theme)).padding(10))
                    .push(Container::new(info).padding(10).width(Length::Fill)),
            )
            .style(move |_| bordered_box(&app.theme))
            .width(Length::Fill)
            .padding(10),
        );
    }
    if app.users.is_empty() {
        list = list.push(Text::new("Nenhum usuário cadastrado."));
    }

    let mut content = Column::new()
        .spacing(15)
        .padding(20)
        .push(
            Row::new()
                .align_y(Alignment::Center)
                .push(title("Usuários"))
                .push(horizontal_space())
                .push(Button::new(Text::new("Novo usuário")).on_press(Message::NewUser)),
        );
    if let Some(line) = notice(app) {
        content = content.push(line);
    }
    content = content.push(Scrollable::new(list.width(Length::Fill)).height(Length::Fill));

    let base = Container::new(content)
        .align_y(Alignment::Start)
        .width(Length::Fill)
        .height(Length::Fill);

    let base = match &app.user_form {
        Some(form) => {
            let password_hint = if form.editing.is_some() {
                "Nova senha (deixe vazio para manter)"
            } else {
                "Senha"
            };
            let mut dialog = Column::new()
                .spacing(10)
                .push(Text::new(if form.editing.is_some() { "Editar usuário" } else { "Novo usuário" }).size(24))
                .push(TextInput::new("Nome", &form.nome).on_input(Message::UserNameChanged))
                .push(TextInput::new("Email", &form.email).on_input(Message::UserEmailChanged))
                .push(
                    TextInput::new(password_hint, &form.senha)
                        .secure(true)
                        .on_input(Message::UserPasswordChanged),
                )
                .push(
                    Row::new()
                        .spacing(10)
                        .align_y(Alignment::Center)
                        .push(Text::new("Tipo:"))
                        .push(PickList::new(Role::ALL, Some(form.tipo), Message::UserRoleSelected)),
                );

            if !form.tipo.is_admin() {
                let turmas = app.turmas.iter().fold(Column::new().spacing(5), |col, turma| {
                    let id = turma.id.clone();
                    col.push(
                        checkbox(&turma.nome, form.turmas_permitidas.contains(&turma.id))
                            .on_toggle(move |_| Message::UserTurmaToggled(id.clone())),
                    )
                });
                dialog = dialog
                    .push(Text::new("Turmas permitidas"))
                    .push(Scrollable::new(turmas).height(Length::Fixed(160.0)));
            }

            if let Some(line) = notice(app) {
                dialog = dialog.push(line);
            }
            dialog = dialog.push(
                Row::new()
                    .spacing(10)
                    .push(Button::new(Text::new("Cancelar")).on_press(Message::CancelUserForm))
                    .push(Button::new(Text::new("Salvar")).on_press(Message::SubmitUser)),
            );
            modal(app, base, dialog)
        }
        None => base,
    };

    with_delete_confirmation(app, base)
}
