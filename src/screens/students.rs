use iced::{Alignment, Length};
use iced::widget::container::bordered_box;
use iced::widget::{Button, Column, Container, PickList, Row, Scrollable, Text, TextInput, horizontal_space};
use crate::app::state::{DatePickerOpen, DeleteTarget, TurmaChoice, format_date};
use crate::app::{App, Message};
use crate::forms::StatusFilter;
use super::common::{date_field, modal, notice, title, with_delete_confirmation};

pub fn students_screen(app: &App) -> Container<Message> {
    let filter = &app.student_filter;

    let mut turma_choices = vec![TurmaChoice::all()];
    turma_choices.extend(app.turmas.iter().map(TurmaChoice::from));
    let selected_choice = turma_choices
        .iter()
        .find(|c| c.id == filter.turma_id)
        .cloned();

    let filter_row = Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(
            TextInput::new("Buscar por nome", &filter.search_input)
                .on_input(Message::StudentSearchChanged)
                .on_submit(Message::StudentSearchApplied)
                .padding(8)
                .width(Length::FillPortion(3)),
        )
        .push(Button::new(Text::new("Buscar")).on_press(Message::StudentSearchApplied))
        .push(PickList::new(turma_choices, selected_choice, Message::StudentTurmaFilterSelected))
        .push(PickList::new(StatusFilter::ALL, Some(filter.status), Message::StudentStatusFilterSelected));

    let found = filter.filter(&app.students);
    let mut list = Column::new().spacing(10).width(Length::Fill);
    if found.is_empty() {
        list = list.push(Text::new("Nenhum aluno encontrado."));
    }
    for student in found {
        let status = if student.ativo { "Ativo" } else { "Inativo" };
        let info = Column::new()
            .spacing(4)
            .width(Length::Fill)
            .push(Text::new(&student.nome_completo).size(18))
            .push(Text::new(format!(
                "Turma: {}   Nascimento: {}   Status: {}",
                app.turma_name(&student.turma_id),
                format_date(student.data_nascimento),
                status
            )))
            .push(Text::new(if student.contato.is_empty() {
                "Contato: não informado".to_string()
            } else {
                format!("Contato: {}", student.contato)
            }));

        let actions = Row::new()
            .spacing(10)
            .push(Button::new(Text::new("Editar")).on_press(Message::EditStudent(student.clone())))
            .push(Button::new(Text::new("Transferir")).on_press(Message::StartTransfer(student.clone())))
            .push(
                Button::new(Text::new("X"))
                    .style(iced::widget::button::danger)
                    .on_press(Message::RequestDelete(DeleteTarget::Student {
                        id: student.id.clone(),
                        name: student.nome_completo.clone(),
                    })),
            );

        list = list.push(
            Container::new(Row::new().spacing(20).align_y(Alignment::Center).push(info).push(actions))
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
                .push(title("Alunos"))
                .push(horizontal_space())
                .push(Button::new(Text::new("Novo aluno")).on_press(Message::NewStudent)),
        )
        .push(filter_row);
    if !filter.search.is_empty() {
        content = content.push(Text::new(format!("Buscando por: \"{}\"", filter.search)).size(14));
    }
    if let Some(line) = notice(app) {
        content = content.push(line);
    }
    content = content.push(Scrollable::new(list).height(Length::Fill));

    let base = Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill);

    let base = match &app.student_form {
        Some(form) => {
            let selected = app.turmas.iter().find(|t| Some(&t.id) == form.turma_id.as_ref()).cloned();
            let mut dialog = Column::new()
                .spacing(10)
                .push(Text::new(if form.editing.is_some() { "Editar aluno" } else { "Novo aluno" }).size(24))
                .push(TextInput::new("Nome completo", &form.nome_completo).on_input(Message::StudentNameChanged))
                .push(date_field(app, "Nascimento", form.data_nascimento, DatePickerOpen::StudentBirth))
                .push(TextInput::new("Contato", &form.contato).on_input(Message::StudentContactChanged))
                .push(
                    PickList::new(app.turmas.clone(), selected, Message::StudentTurmaSelected)
                        .placeholder("Turma"),
                );
            if let Some(line) = notice(app) {
                dialog = dialog.push(line);
            }
            dialog = dialog.push(
                Row::new()
                    .spacing(10)
                    .push(Button::new(Text::new("Cancelar")).on_press(Message::CancelStudentForm))
                    .push(Button::new(Text::new("Salvar")).on_press(Message::SubmitStudent)),
            );
            modal(app, base, dialog)
        }
        None => base,
    };

    let base = match &app.transfer {
        Some(transfer) => {
            let targets: Vec<_> = app
                .turmas
                .iter()
                .filter(|t| t.id != transfer.student.turma_id)
                .cloned()
                .collect();
            let mut dialog = Column::new()
                .spacing(10)
                .push(Text::new("Transferir aluno").size(24))
                .push(Text::new(format!(
                    "{} (turma atual: {})",
                    transfer.student.nome_completo,
                    app.turma_name(&transfer.student.turma_id)
                )))
                .push(
                    PickList::new(targets, transfer.target.clone(), Message::TransferTargetSelected)
                        .placeholder("Nova turma"),
                );
            if let Some(line) = notice(app) {
                dialog = dialog.push(line);
            }
            dialog = dialog.push(
                Row::new()
                    .spacing(10)
                    .push(Button::new(Text::new("Cancelar")).on_press(Message::CancelTransfer))
                    .push(Button::new(Text::new("Transferir")).on_press(Message::ConfirmTransfer)),
            );
            modal(app, base, dialog)
        }
        None => base,
    };

    with_delete_confirmation(app, base)
}
