use iced::{widget::{column, pick_list, text, Container, Space}, Center, Length};
use crate::app::{App, Message};
use crate::config::{theme_names, theme_to_str};
use super::common::title;

pub fn settings_screen(app: &App) -> Container<Message> {
    let current_name = theme_to_str(&app.theme);
    let content = column![
        title("Configurações"),
        Space::with_height(20),
        text("Tema"),
        pick_list(theme_names(), Some(current_name), Message::ThemeSelected)
            .placeholder("Selecione um tema"),
        Space::with_height(20),
        text(format!("Servidor: {}", app.api.base_url())).size(14),
        text(format!("Dados locais: {}", app.config.data_dir.display())).size(14),
    ]
    .spacing(15)
    .align_x(Center);

    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(40)
}
