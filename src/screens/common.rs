use chrono::NaiveDate;
use iced::{Alignment, Color, Element, Length, Renderer, Theme};
use iced::widget::container::{background, bordered_box};
use iced::widget::{Button, Column, Container, Row, Stack, Text, mouse_area, text};
use iced_aw::date_picker;
use iced_font_awesome::fa_icon_solid;
use crate::app::state::{DatePickerOpen, format_date, to_picker};
use crate::app::{App, Message};

pub const ERROR_COLOR: Color = Color { r: 0.8, g: 0.14, b: 0.11, a: 1.0 };
pub const SUCCESS_COLOR: Color = Color { r: 0.2, g: 0.6, b: 0.3, a: 1.0 };
pub const WARNING_COLOR: Color = Color { r: 0.84, g: 0.6, b: 0.13, a: 1.0 };

pub fn icon_button_content<'a>(
    icon_element: impl Into<Element<'a, Message, Theme, Renderer>>,
    label: &'a str,
) -> Row<'a, Message> {
    Row::new()
        .align_y(Alignment::Center)
        .spacing(5)
        .push(icon_element)
        .push(text(label))
}

pub fn title(label: &str) -> Text<'_> {
    Text::new(label).size(30)
}

/// Status line of the last save/delete, if any.
pub fn notice(app: &App) -> Option<Text<'_>> {
    app.notice.as_ref().map(|n| {
        Text::new(&n.message)
            .size(18)
            .color(if n.is_error { ERROR_COLOR } else { SUCCESS_COLOR })
    })
}

/// Calendar button with its popup plus the formatted date.
pub fn date_field<'a>(
    app: &'a App,
    label: &'a str,
    date: NaiveDate,
    target: DatePickerOpen,
) -> Row<'a, Message> {
    let underlay = Button::new(icon_button_content(
        fa_icon_solid("calendar").style(move |_| text::base(&app.theme)),
        label,
    ))
    .on_press(Message::OpenDatePicker(target));

    Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(date_picker(
            app.date_picker_open == target,
            to_picker(date),
            underlay,
            Message::CancelDatePicker,
            Message::SubmitDate,
        ))
        .push(Text::new(format_date(date)).size(18))
}

/// Boxed label/value pair used for the summary figures.
pub fn stat_card<'a>(app: &'a App, label: &'a str, value: String) -> Container<'a, Message> {
    Container::new(
        Column::new()
            .spacing(5)
            .push(Text::new(label).size(14))
            .push(Text::new(value).size(26)),
    )
    .style(move |_| bordered_box(&app.theme))
    .padding(15)
    .width(Length::FillPortion(1))
}

/// Lays `content` over `base` on a dimmed backdrop.
pub fn modal<'a>(
    app: &'a App,
    base: Container<'a, Message>,
    content: Column<'a, Message>,
) -> Container<'a, Message> {
    let dialog = Container::new(content)
        .style(move |_| bordered_box(&app.theme))
        .padding(20)
        .width(Length::Fixed(480.0));

    let overlay = Container::new(
        mouse_area(Container::new(dialog).center(Length::Fill).padding(40))
            .on_press(Message::Ignore),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .style(move |_| background(Color { r: 0.0, g: 0.0, b: 0.0, a: 0.7 }));

    Container::new(Stack::new().push(base).push(overlay))
}

/// Confirmation dialog for `app.pending_delete`, laid over `base`.
pub fn with_delete_confirmation<'a>(app: &'a App, base: Container<'a, Message>) -> Container<'a, Message> {
    let Some(target) = &app.pending_delete else {
        return base;
    };
    let content = Column::new()
        .spacing(15)
        .push(Text::new("Confirmar exclusão").size(24))
        .push(Text::new(format!("Tem certeza que deseja excluir \"{}\"?", target.name())))
        .push(
            Row::new()
                .spacing(10)
                .push(Button::new(Text::new("Cancelar")).on_press(Message::CancelDelete))
                .push(
                    Button::new(Text::new("Excluir"))
                        .style(iced::widget::button::danger)
                        .on_press(Message::ConfirmDelete),
                ),
        );
    modal(app, base, content)
}
