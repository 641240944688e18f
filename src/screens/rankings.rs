use iced::{Alignment, Length};
use iced::widget::container::bordered_box;
use iced::widget::{Button, Column, Container, Row, Scrollable, Text, button};
use crate::api::models::{ClassRanking, PersonRanking};
use crate::app::state::RankingTab;
use crate::app::{App, Message};
use super::common::title;

fn person_line(position: usize, entry: &PersonRanking) -> Row<'_, Message> {
    let class_name = entry.class_name.as_deref().unwrap_or("");
    Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(Text::new(format!("{position}º")).size(18).width(Length::Fixed(50.0)))
        .push(Text::new(&entry.name).size(18).width(Length::FillPortion(3)))
        .push(Text::new(class_name).width(Length::FillPortion(2)))
        .push(Text::new(format!("{} presenças", entry.total_presences)).width(Length::FillPortion(1)))
        .push(Text::new(format!("{} domingos", entry.sundays_present)).width(Length::FillPortion(1)))
}

fn class_line(position: usize, entry: &ClassRanking) -> Row<'_, Message> {
    Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(Text::new(format!("{position}º")).size(18).width(Length::Fixed(50.0)))
        .push(Text::new(&entry.class_name).size(18).width(Length::FillPortion(3)))
        .push(Text::new(format!("{} matriculados", entry.enrolled)).width(Length::FillPortion(1)))
        .push(Text::new(format!("média {:.1}", entry.average_presences)).width(Length::FillPortion(1)))
        .push(Text::new(format!("{:.1}%", entry.attendance_percent)).width(Length::FillPortion(1)))
        .push(Text::new(format!("{} domingos", entry.sundays_with_data)).width(Length::FillPortion(1)))
}

pub fn rankings_screen(app: &App) -> Container<Message> {
    let tabs = RankingTab::ALL.iter().fold(Row::new().spacing(10), |row, &tab| {
        row.push(
            Button::new(Text::new(tab.to_string()))
                .style(if tab == app.ranking_tab { button::primary } else { button::secondary })
                .on_press(Message::RankingTabSelected(tab)),
        )
    });

    let lines: Vec<Row<Message>> = match app.ranking_tab {
        RankingTab::Students => app.rankings.students.iter().enumerate()
            .map(|(i, e)| person_line(i + 1, e))
            .collect(),
        RankingTab::Teachers => app.rankings.teachers.iter().enumerate()
            .map(|(i, e)| person_line(i + 1, e))
            .collect(),
        RankingTab::Classes => app.rankings.classes.iter().enumerate()
            .map(|(i, e)| class_line(i + 1, e))
            .collect(),
    };

    let mut list = Column::new().spacing(10).width(Length::Fill);
    if app.rankings_loading {
        list = list.push(Text::new("Carregando rankings..."));
    } else if lines.is_empty() {
        list = list.push(Text::new("Nenhum dado de frequência ainda."));
    }
    for line in lines {
        list = list.push(
            Container::new(line)
                .style(move |_| bordered_box(&app.theme))
                .padding(10)
                .width(Length::Fill),
        );
    }

    let content = Column::new()
        .spacing(20)
        .padding(20)
        .push(title("Rankings"))
        .push(tabs)
        .push(Scrollable::new(list).height(Length::Fill));

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
}
