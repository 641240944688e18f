use iced::{Alignment, Length};
use iced::widget::container::bordered_box;
use iced::widget::{Column, Container, Row, Rule, Scrollable, Text, horizontal_space};
use crate::api::models::AttendanceRow;
use crate::app::state::DatePickerOpen;
use crate::app::{App, Message};
use crate::dashboard::{self, Summary, format_brl};
use super::common::{date_field, title};

const HEADERS: [&str; 10] = [
    "Turma", "Matric.", "Pres.", "Aus.", "Visit.", "Pós-ch.", "Freq.", "Bíblias", "Revistas", "Ofertas",
];

fn cells<'a>(values: [String; 10], size: u16) -> Row<'a, Message> {
    values.into_iter().enumerate().fold(Row::new().spacing(8), |row, (i, value)| {
        let portion = if i == 0 { 3 } else { 1 };
        row.push(Text::new(value).size(size).width(Length::FillPortion(portion)))
    })
}

fn row_cells(row: &AttendanceRow) -> [String; 10] {
    [
        row.class_name.clone(),
        row.enrolled.to_string(),
        row.present.to_string(),
        row.absent.to_string(),
        row.visitors.to_string(),
        row.post_call.to_string(),
        format!("{:.1}%", dashboard::percentage(row.present, row.enrolled)),
        row.bibles.to_string(),
        row.magazines.to_string(),
        format_brl(row.offerings_total),
    ]
}

/// Per-class table for one Sunday plus the totals line.
pub fn reports_screen(app: &App) -> Container<Message> {
    let rows = &app.report_rows;
    let summary = Summary::of(rows);

    let header = Row::new()
        .spacing(20)
        .align_y(Alignment::Center)
        .push(title("Relatórios"))
        .push(horizontal_space())
        .push(date_field(app, "Domingo", app.report_date, DatePickerOpen::Reports));

    let mut table = Column::new()
        .spacing(6)
        .width(Length::Fill)
        .push(cells(HEADERS.map(String::from), 16))
        .push(Rule::horizontal(1));

    if rows.is_empty() {
        table = table.push(Text::new("Nenhum dado para esta data."));
    }
    for row in rows {
        table = table.push(cells(row_cells(row), 15));
    }

    let sum = |f: fn(&AttendanceRow) -> i64| rows.iter().map(f).sum::<i64>().to_string();
    let totals = [
        "Total".to_string(),
        summary.total_enrolled.to_string(),
        summary.total_present.to_string(),
        sum(|r| r.absent),
        sum(|r| r.visitors),
        sum(|r| r.post_call),
        format!("{:.1}%", summary.attendance_rate),
        sum(|r| r.bibles),
        sum(|r| r.magazines),
        format_brl(summary.total_offerings),
    ];
    table = table.push(Rule::horizontal(1)).push(cells(totals, 16));

    let content = Column::new()
        .spacing(20)
        .padding(20)
        .push(header)
        .push(
            Container::new(Scrollable::new(table.padding(10)))
                .style(move |_| bordered_box(&app.theme))
                .width(Length::Fill)
                .height(Length::Fill),
        );

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
}
