use iced::{Alignment, Length};
use iced::widget::container::bordered_box;
use iced::widget::{Button, Column, Container, Row, Scrollable, Text, horizontal_space};
use crate::api::models::Role;
use crate::app::state::DatePickerOpen;
use crate::app::{App, Message};
use crate::backup::{BackupFile, collection_label};
use crate::dashboard::{self, Summary, format_brl};
use super::common::{ERROR_COLOR, WARNING_COLOR, date_field, modal, notice, stat_card, title};

fn backup_row(app: &App) -> Row<Message> {
    let idle = !app.backup_busy;
    Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(Text::new("Backup").size(18))
        .push(
            Button::new(Text::new(if app.backup_busy { "Aguarde..." } else { "Gerar backup" }))
                .on_press_maybe(idle.then_some(Message::GenerateBackup)),
        )
        .push(
            Button::new(Text::new("Restaurar backup"))
                .style(iced::widget::button::danger)
                .on_press_maybe(idle.then_some(Message::PickRestoreFile)),
        )
}

fn restore_confirmation(file: &BackupFile) -> Column<'_, Message> {
    let mut dialog = Column::new()
        .spacing(10)
        .push(Text::new("Restaurar backup").size(24));
    if let Some(date) = &file.backup_date {
        dialog = dialog.push(Text::new(format!("Data do backup: {date}")));
    }
    if let Some(total) = file.total_records {
        dialog = dialog.push(Text::new(format!("Total de registros: {total}")));
    }
    dialog = dialog.push(
        Text::new("Atenção: esta operação substitui todos os dados existentes!").color(ERROR_COLOR),
    );
    for (collection, count) in &file.counts {
        dialog = dialog.push(Text::new(format!("{}: {count} registros", collection_label(collection))));
    }
    dialog.push(
        Row::new()
            .spacing(10)
            .push(Button::new(Text::new("Cancelar")).on_press(Message::CancelRestore))
            .push(
                Button::new(Text::new("Restaurar"))
                    .style(iced::widget::button::danger)
                    .on_press(Message::ConfirmRestore),
            ),
    )
}

pub fn dashboard_screen(app: &App) -> Container<Message> {
    let summary = Summary::of(&app.dashboard_rows);

    let header = Row::new()
        .spacing(20)
        .align_y(Alignment::Center)
        .push(title("Painel"))
        .push(horizontal_space())
        .push(date_field(app, "Domingo", app.dashboard_date, DatePickerOpen::Dashboard))
        .push(Button::new(Text::new("Atualizar")).on_press(Message::RefreshDashboard));

    let mut main_column = Column::new()
        .spacing(20)
        .padding(20)
        .width(Length::Fill)
        .push(header);

    if !dashboard::is_sunday(app.dashboard_date) {
        main_column = main_column.push(
            Text::new("A data selecionada não é um domingo: os dados podem estar vazios.")
                .color(WARNING_COLOR),
        );
    }
    if app.dashboard_loading {
        main_column = main_column.push(Text::new("Carregando..."));
    }
    if let Some(line) = notice(app) {
        main_column = main_column.push(line);
    }

    main_column = main_column.push(
        Row::new()
            .spacing(15)
            .push(stat_card(app, "Matriculados", summary.total_enrolled.to_string()))
            .push(stat_card(app, "Presentes", summary.total_present.to_string()))
            .push(stat_card(app, "Frequência", format!("{:.1}%", summary.attendance_rate)))
            .push(stat_card(app, "Ofertas", format_brl(summary.total_offerings))),
    );

    let best = match summary.best_attendance_class {
        Some(row) => format!(
            "{} ({:.1}%)",
            row.class_name,
            dashboard::percentage(row.present, row.enrolled)
        ),
        None => "Sem dados".to_string(),
    };
    let top = match summary.top_offering_class {
        Some(row) => format!("{} ({})", row.class_name, format_brl(row.offerings_total)),
        None => "Sem dados".to_string(),
    };
    main_column = main_column.push(
        Row::new()
            .spacing(15)
            .push(stat_card(app, "Melhor frequência", best))
            .push(stat_card(app, "Maior oferta", top)),
    );

    let mut classes = Column::new().spacing(10).width(Length::Fill);
    if app.dashboard_rows.is_empty() && !app.dashboard_loading {
        classes = classes.push(Text::new("Nenhuma chamada registrada para esta data."));
    }
    for row in &app.dashboard_rows {
        let line = Row::new()
            .spacing(10)
            .align_y(Alignment::Center)
            .push(Text::new(&row.class_name).size(18).width(Length::FillPortion(3)))
            .push(Text::new(format!("{} / {}", row.present, row.enrolled)).width(Length::FillPortion(1)))
            .push(
                Text::new(format!("{:.1}%", dashboard::percentage(row.present, row.enrolled)))
                    .width(Length::FillPortion(1)),
            )
            .push(Text::new(format_brl(row.offerings_total)).width(Length::FillPortion(1)));
        classes = classes.push(
            Container::new(line)
                .style(move |_| bordered_box(&app.theme))
                .padding(10)
                .width(Length::Fill),
        );
    }
    main_column = main_column
        .push(Text::new("Turmas").size(22))
        .push(Scrollable::new(classes).height(Length::Fill));
    if app.session.role() == Some(Role::Admin) {
        main_column = main_column.push(backup_row(app));
    }

    let base = Container::new(main_column)
        .width(Length::Fill)
        .height(Length::Fill);

    match &app.pending_restore {
        Some(file) => modal(app, base, restore_confirmation(file)),
        None => base,
    }
}
