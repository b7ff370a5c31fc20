// SPDX-License-Identifier: MPL-2.0
//! Event subscriptions for the application.
//!
//! Window events become lifecycle messages that `App::update` forwards
//! to the embedded map view; a periodic tick drives notification
//! auto-dismiss while any toast is visible.

use super::Message;
use iced::{event, time, window, Subscription};
use std::time::Duration;

/// Maps native window events onto lifecycle messages.
pub fn create_event_subscription() -> Subscription<Message> {
    event::listen_with(|event, _status, window_id| match event {
        event::Event::Window(window::Event::Opened { .. }) => Some(Message::WindowOpened),
        event::Event::Window(window::Event::Focused) => Some(Message::WindowFocused),
        event::Event::Window(window::Event::Unfocused) => Some(Message::WindowUnfocused),
        event::Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized(size)),
        event::Event::Window(window::Event::CloseRequested) => {
            Some(Message::WindowCloseRequested(window_id))
        }
        _ => None,
    })
}

/// Ticks only while notifications are showing.
pub fn create_tick_subscription(has_notifications: bool) -> Subscription<Message> {
    if has_notifications {
        time::every(Duration::from_millis(100)).map(Message::Tick)
    } else {
        Subscription::none()
    }
}
