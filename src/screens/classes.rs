use iced::{Alignment, Length};
use iced::widget::container::bordered_box;
use iced::widget::{Button, Column, Container, Row, Scrollable, Text, TextInput, horizontal_space};
use crate::app::state::DeleteTarget;
use crate::app::{App, Message};
use super::common::{modal, notice, title, with_delete_confirmation};

pub fn classes_screen(app: &App) -> Container<Message> {
    let mut list = Column::new().spacing(10).width(Length::Fill);
    if app.turmas.is_empty() {
        list = list.push(Text::new("Nenhuma turma cadastrada."));
    }

    for turma in &app.turmas {
        let mut info = Column::new()
            .spacing(4)
            .width(Length::Fill)
            .push(Text::new(&turma.nome).size(20));
        if let Some(descricao) = turma.descricao.as_deref().filter(|d| !d.is_empty()) {
            info = info.push(Text::new(descricao));
        }
        if !turma.ativa {
            info = info.push(Text::new("Inativa").size(14));
        }

        let header = Row::new()
            .spacing(10)
            .align_y(Alignment::Center)
            .push(info)
            .push(horizontal_space())
            .push(Button::new(Text::new("Editar")).on_press(Message::EditTurma(turma.clone())))
            .push(
                Button::new(Text::new("X"))
                    .style(iced::widget::button::danger)
                    .on_press(Message::RequestDelete(DeleteTarget::Turma {
                        id: turma.id.clone(),
                        name: turma.nome.clone(),
                    })),
            );

        list = list.push(
            Container::new(header)
                .style(move |_| bordered_box(&app.theme))
                .padding(10)
                .width(Length::Fill),
        );
    }

    let mut content = Column::new()
        .spacing(15)
        .padding(20)
        .push(
            Row::new()
                .align_y(Alignment::Center)
                .push(title("Turmas"))
                .push(horizontal_space())
                .push(Button::new(Text::new("Nova turma")).on_press(Message::NewTurma)),
        );
    if let Some(line) = notice(app) {
        content = content.push(line);
    }
    content = content.push(Scrollable::new(list).height(Length::Fill));

    let base = Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill);

    let base = match &app.turma_form {
        Some(form) => {
            let mut dialog = Column::new()
                .spacing(10)
                .push(Text::new(if form.editing.is_some() { "Editar turma" } else { "Nova turma" }).size(24))
                .push(TextInput::new("Nome", &form.nome).on_input(Message::TurmaNameChanged))
                .push(TextInput::new("Descrição", &form.descricao).on_input(Message::TurmaDescriptionChanged));
            if let Some(line) = notice(app) {
                dialog = dialog.push(line);
            }
            dialog = dialog.push(
                Row::new()
                    .spacing(10)
                    .push(Button::new(Text::new("Cancelar")).on_press(Message::CancelTurmaForm))
                    .push(Button::new(Text::new("Salvar")).on_press(Message::SubmitTurma)),
            );
            modal(app, base, dialog)
        }
        None => base,
    };

    with_delete_confirmation(app, base)
}
