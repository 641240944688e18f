use iced::{Alignment, Length};
use iced::widget::container::bordered_box;
use iced::widget::{Button, Column, Container, Row, Scrollable, Text, TextInput, checkbox, horizontal_space};
use crate::app::state::{DatePickerOpen, DeleteTarget};
use crate::app::{App, Message};
use crate::forms::LESSONS_PER_QUARTER;
use crate::router::View;
use super::common::{date_field, modal, notice, title, with_delete_confirmation};

const THEME_PREVIEW_CHARS: usize = 80;

fn preview(tema: &str) -> String {
    if tema.chars().count() > THEME_PREVIEW_CHARS {
        let cut: String = tema.chars().take(THEME_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        tema.to_string()
    }
}

pub fn magazine_admin_screen(app: &App) -> Container<Message> {
    let mut list = Column::new().spacing(10).width(Length::Fill);
    if app.revistas.is_empty() && !app.revistas_loading {
        list = list.push(Text::new("Nenhuma revista cadastrada."));
    }

    for revista in &app.revistas {
        let turmas = revista
            .turma_ids
            .iter()
            .take(3)
            .map(|id| app.turma_name(id))
            .collect::<Vec<_>>()
            .join(", ");
        let mut info = Column::new()
            .spacing(4)
            .width(Length::Fill)
            .push(Text::new(preview(&revista.tema)).size(18))
            .push(Text::new(format!("{turmas} • {} lições", revista.licoes.len())).size(14));
        if !revista.ativa {
            info = info.push(Text::new("Inativa").size(14));
        }

        let line = Row::new()
            .spacing(10)
            .align_y(Alignment::Center)
            .push(info)
            .push(Button::new(Text::new("Editar")).on_press(Message::EditRevista(revista.clone())))
            .push(
                Button::new(Text::new("Remover"))
                    .style(iced::widget::button::danger)
                    .on_press(Message::RequestDelete(DeleteTarget::Revista {
                        id: revista.id.clone(),
                        name: preview(&revista.tema),
                    })),
            );
        list = list.push(
            Container::new(line)
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
                .spacing(10)
                .align_y(Alignment::Center)
                .push(Button::new(Text::new("Voltar")).on_press(Message::Navigate(View::Magazines)))
                .push(title("Gerenciar revistas"))
                .push(horizontal_space())
                .push(Button::new(Text::new("Nova revista")).on_press(Message::NewRevista)),
        );
    if let Some(line) = notice(app) {
        content = content.push(line);
    }
    content = content
        .push(Text::new(format!("Revistas ({})", app.revistas.len())).size(20))
        .push(Scrollable::new(list).height(Length::Fill));

    let base = Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill);

    let base = match &app.revista_form {
        Some(form) => {
            let turmas = app.turmas.iter().fold(Column::new().spacing(5), |col, turma| {
                let id = turma.id.clone();
                col.push(
                    checkbox(&turma.nome, form.turma_ids.contains(&turma.id))
                        .on_toggle(move |_| Message::RevistaTurmaToggled(id.clone())),
                )
            });

            let mut lessons = Column::new().spacing(8);
            for (index, lesson) in form.licoes.iter().enumerate() {
                lessons = lessons.push(
                    Row::new()
                        .spacing(10)
                        .align_y(Alignment::Center)
                        .push(
                            TextInput::new(&format!("Título da lição {}", index + 1), &lesson.titulo)
                                .on_input(move |v| Message::LessonTitleChanged(index, v))
                                .width(Length::Fill),
                        )
                        .push(date_field(app, "Data", lesson.data, DatePickerOpen::Lesson(index))),
                );
            }

            let mut dialog = Column::new()
                .spacing(10)
                .push(Text::new(if form.editing.is_some() { "Editar revista" } else { "Nova revista" }).size(24))
                .push(TextInput::new("Tema do trimestre", &form.tema).on_input(Message::RevistaThemeChanged))
                .push(Text::new("Turmas"))
                .push(Scrollable::new(turmas).height(Length::Fixed(120.0)))
                .push(Text::new(format!("Lições do trimestre ({LESSONS_PER_QUARTER})")))
                .push(Scrollable::new(lessons).height(Length::Fixed(260.0)))
                .push(Text::new("Lições sem título não são salvas.").size(12));
            if let Some(line) = notice(app) {
                dialog = dialog.push(line);
            }
            dialog = dialog.push(
                Row::new()
                    .spacing(10)
                    .push(Button::new(Text::new("Cancelar")).on_press(Message::CancelRevistaForm))
                    .push(Button::new(Text::new("Salvar")).on_press(Message::SubmitRevista)),
            );
            modal(app, base, dialog)
        }
        None => base,
    };

    with_delete_confirmation(app, base)
}
