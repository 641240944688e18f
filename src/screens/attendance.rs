use iced::{Alignment, Length};
use iced::widget::container::bordered_box;
use iced::widget::{Button, Column, Container, PickList, Row, Scrollable, Text, TextInput, checkbox, horizontal_space};
use crate::app::state::DatePickerOpen;
use crate::app::{App, Message};
use crate::attendance::TotalField;
use crate::dashboard;
use super::common::{SUCCESS_COLOR, WARNING_COLOR, date_field, notice, title};

fn total_input<'a>(label: &'a str, placeholder: &'a str, value: &'a str, field: TotalField) -> Column<'a, Message> {
    Column::new()
        .spacing(5)
        .width(Length::FillPortion(1))
        .push(Text::new(label).size(14))
        .push(
            TextInput::new(placeholder, value)
                .on_input(move |v| Message::TotalChanged(field, v))
                .padding(8),
        )
}

pub fn attendance_screen(app: &App) -> Container<Message> {
    let visible = app.visible_turmas();
    let mut main_column = Column::new()
        .spacing(20)
        .padding(20)
        .width(Length::Fill)
        .height(Length::Fill);

    let class_picker = if visible.is_empty() {
        Row::new().push(Text::new("Nenhuma turma disponível."))
    } else {
        Row::new()
            .spacing(10)
            .align_y(Alignment::Center)
            .push(Text::new("Turma:"))
            .push(
                PickList::new(visible, app.attendance_turma.clone(), Message::AttendanceTurmaSelected)
                    .placeholder("Selecione a turma"),
            )
    };

    main_column = main_column.push(
        Row::new()
            .spacing(20)
            .align_y(Alignment::Center)
            .push(title("Chamada"))
            .push(horizontal_space())
            .push(class_picker)
            .push(date_field(app, "Data", app.attendance_date, DatePickerOpen::Attendance)),
    );

    if !dashboard::is_sunday(app.attendance_date) {
        main_column = main_column
            .push(Text::new("Atenção: a data selecionada não é um domingo.").color(WARNING_COLOR));
    }
    if let Some(line) = notice(app) {
        main_column = main_column.push(line);
    }

    let Some(turma) = &app.attendance_turma else {
        main_column = main_column.push(Text::new("Selecione uma turma para fazer a chamada."));
        return Container::new(main_column).width(Length::Fill).height(Length::Fill);
    };

    if let Some(revista) = &app.attendance_revista {
        let lesson = match revista.lesson_on(app.attendance_date) {
            Some((number, licao)) => Text::new(format!("Lição {number}: {}", licao.titulo)).color(SUCCESS_COLOR),
            None => Text::new("Nenhuma lição cadastrada para esta data."),
        };
        main_column = main_column.push(
            Container::new(
                Column::new()
                    .spacing(4)
                    .push(Text::new(format!("Revista: {}", revista.tema)).size(16))
                    .push(lesson),
            )
            .style(move |_| bordered_box(&app.theme))
            .padding(10)
            .width(Length::Fill),
        );
    }

    let present = app.roll_call.iter().filter(|e| e.present).count();
    main_column = main_column.push(
        Text::new(format!("{}: {} de {} presentes", turma.nome, present, app.roll_call.len())).size(20),
    );

    let mut students = Column::new().spacing(8).width(Length::Fill);
    if app.roll_call.is_empty() {
        students = students.push(Text::new("Nenhum aluno ativo nesta turma."));
    }
    for (index, entry) in app.roll_call.iter().enumerate() {
        students = students.push(
            Container::new(
                checkbox(&entry.name, entry.present)
                    .on_toggle(move |present| Message::PresenceToggled(index, present))
                    .size(20),
            )
            .style(move |_| bordered_box(&app.theme))
            .padding(10)
            .width(Length::Fill),
        );
    }
    main_column = main_column.push(Scrollable::new(students).height(Length::Fill));

    let totals = &app.roll_totals;
    main_column = main_column.push(
        Row::new()
            .spacing(15)
            .push(total_input("Oferta (R$)", "0,00", &totals.offering, TotalField::Offering))
            .push(total_input("Bíblias", "0", &totals.bibles, TotalField::Bibles))
            .push(total_input("Revistas", "0", &totals.magazines, TotalField::Magazines))
            .push(total_input("Visitantes", "0", &totals.visitors, TotalField::Visitors))
            .push(total_input("Pós-chamada", "0", &totals.post_call, TotalField::PostCall)),
    );

    main_column = main_column.push(
        Button::new(Text::new(if app.attendance_saving { "Salvando..." } else { "Salvar chamada" }))
            .on_press_maybe((!app.attendance_saving).then_some(Message::SaveAttendance))
            .padding(10),
    );

    Container::new(main_column)
        .width(Length::Fill)
        .height(Length::Fill)
}
