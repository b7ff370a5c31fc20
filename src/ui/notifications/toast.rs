// SPDX-License-Identifier: MPL-2.0
//! Toast rendering: a column of dismissible notification cards in the
//! top-right corner of the window.

use super::{Manager, Message, Notification};
use crate::ui::theme;
use iced::widget::{button, column, container, row, text};
use iced::{Alignment, Border, Element, Length, Padding};

const TOAST_WIDTH: f32 = 320.0;

/// Builds the toast overlay for the currently visible notifications.
pub fn view(manager: &Manager) -> Element<'_, Message> {
    let toasts = column(manager.visible().map(card)).spacing(8);

    container(toasts)
        .width(Length::Fill)
        .align_x(Alignment::End)
        .padding(12)
        .into()
}

fn card(notification: &Notification) -> Element<'_, Message> {
    let accent = notification.severity().color();
    let id = notification.id();

    let content = row![
        text(notification.message())
            .size(14)
            .color(theme::toast_text())
            .width(Length::Fill),
        button(text("\u{2715}").size(12))
            .style(button::text)
            .on_press(Message::Dismiss(id)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    container(content)
        .width(Length::Fixed(TOAST_WIDTH))
        .padding(Padding::new(10.0))
        .style(move |_theme| container::Style {
            background: Some(theme::toast_background().into()),
            border: Border {
                color: accent,
                width: 1.0,
                radius: 6.0.into(),
            },
            ..Default::default()
        })
        .into()
}
