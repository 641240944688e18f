use std::cmp::Ordering;
use iced::{Alignment, Length};
use iced::widget::container::bordered_box;
use iced::widget::{Button, Column, Container, Row, Scrollable, Text, horizontal_space};
use crate::api::models::Revista;
use crate::app::state::format_date;
use crate::app::{App, Message};
use crate::router::View;
use super::common::{SUCCESS_COLOR, title};

fn revista_card<'a>(app: &'a App, revista: &'a Revista) -> Container<'a, Message> {
    let turmas = revista
        .turma_ids
        .iter()
        .map(|id| app.turma_name(id))
        .collect::<Vec<_>>()
        .join(", ");

    let mut card = Column::new()
        .spacing(8)
        .push(Text::new("Revista trimestral").size(14))
        .push(Text::new(&revista.tema).size(22))
        .push(Text::new(format!("Turmas: {turmas}")).size(14));

    if let Some((number, licao)) = revista.lesson_on(app.today) {
        card = card.push(
            Text::new(format!("Lição de hoje ({number}): {}", licao.titulo))
                .size(18)
                .color(SUCCESS_COLOR),
        );
    }

    let mut lessons = Column::new().spacing(4);
    for (index, licao) in revista.licoes.iter().enumerate() {
        let line = Row::new()
            .spacing(10)
            .push(Text::new(format!("{}. {}", index + 1, licao.titulo)).width(Length::Fill))
            .push(Text::new(format_date(licao.data)));
        let line = match licao.data.cmp(&app.today) {
            Ordering::Equal => line.push(Text::new("hoje").color(SUCCESS_COLOR)),
            Ordering::Less => line.push(Text::new("dada")),
            Ordering::Greater => line,
        };
        lessons = lessons.push(line);
    }
    card = card.push(lessons);

    let mut footer = format!("Total de lições: {}", revista.licoes.len());
    if let Some(created) = revista.created_on() {
        footer.push_str(&format!(" | Criada em: {}", format_date(created)));
    }
    card = card.push(Text::new(footer).size(12));

    Container::new(card)
        .style(move |_| bordered_box(&app.theme))
        .padding(15)
        .width(Length::Fill)
}

/// Quarterly magazines with their lesson schedule; today's lesson stands out.
pub fn magazines_screen(app: &App) -> Container<Message> {
    let is_admin = app.session.role().is_some_and(|r| r.is_admin());

    let mut header = Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(title("Revistas"))
        .push(horizontal_space())
        .push(
            Button::new(Text::new(if app.revistas_loading { "Carregando..." } else { "Atualizar" }))
                .on_press_maybe((!app.revistas_loading).then_some(Message::RefreshRevistas)),
        );
    if is_admin {
        header = header.push(
            Button::new(Text::new("Gerenciar revistas")).on_press(Message::Navigate(View::MagazineAdmin)),
        );
    }

    let mut list = Column::new().spacing(15).width(Length::Fill);
    if app.revistas.is_empty() && !app.revistas_loading {
        list = list.push(Text::new("Nenhuma revista cadastrada."));
    }
    for revista in &app.revistas {
        list = list.push(revista_card(app, revista));
    }

    let content = Column::new()
        .spacing(15)
        .padding(20)
        .push(header)
        .push(Scrollable::new(list).height(Length::Fill));

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
}
