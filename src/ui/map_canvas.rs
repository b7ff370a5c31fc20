// SPDX-License-Identifier: MPL-2.0
//! Canvas widget painting the map scene.
//!
//! The canvas draws whatever the map view's scene says and translates
//! pointer input into camera gestures. Geometry is cached; the
//! application clears the cache whenever the scene changes.

use crate::map::MapView;
use iced::widget::canvas::{self, Canvas, Frame, Geometry};
use iced::widget::Action;
use iced::{mouse, Element, Length, Point, Rectangle, Renderer, Size, Theme};

/// Zoom levels added per scroll-wheel line.
pub const WHEEL_ZOOM_STEP: f64 = 0.25;

/// Pixel equivalent of one wheel line for trackpad deltas.
const PIXELS_PER_LINE: f32 = 40.0;

/// Camera gestures emitted by the canvas.
#[derive(Debug, Clone)]
pub enum Message {
    Panned { dx: f32, dy: f32 },
    Zoomed { delta: f64, cursor: Option<Point> },
}

/// Per-widget interaction state tracked by the canvas runtime.
#[derive(Debug, Default)]
pub struct Interaction {
    drag_last: Option<Point>,
}

pub struct MapCanvas<'a> {
    map: &'a MapView,
    cache: &'a canvas::Cache,
}

/// Builds the canvas element for the current map state.
pub fn view<'a>(map: &'a MapView, cache: &'a canvas::Cache) -> Element<'a, Message> {
    Canvas::new(MapCanvas { map, cache })
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

impl canvas::Program<Message> for MapCanvas<'_> {
    type State = Interaction;

    fn update(
        &self,
        state: &mut Self::State,
        event: &iced::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        match event {
            iced::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    state.drag_last = Some(position);
                }
                None
            }
            iced::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let position = cursor.position_in(bounds)?;
                let last = state.drag_last?;
                state.drag_last = Some(position);
                let dx = position.x - last.x;
                let dy = position.y - last.y;
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                Some(Action::publish(Message::Panned { dx, dy }).and_capture())
            }
            iced::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
            | iced::Event::Mouse(mouse::Event::CursorLeft) => {
                state.drag_last = None;
                None
            }
            iced::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let lines = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y,
                    mouse::ScrollDelta::Pixels { y, .. } => *y / PIXELS_PER_LINE,
                };
                if lines == 0.0 {
                    return None;
                }
                Some(
                    Action::publish(Message::Zoomed {
                        delta: f64::from(lines) * WHEEL_ZOOM_STEP,
                        cursor: cursor.position_in(bounds),
                    })
                    .and_capture(),
                )
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let scene = self.map.scene();
        let geometry = self.cache.draw(renderer, bounds.size(), |frame: &mut Frame| {
            frame.fill_rectangle(Point::ORIGIN, frame.size(), scene.background);

            let Some(style) = self.map.style() else {
                return;
            };
            for sprite in &scene.sprites {
                let Some(image) = style.image(&sprite.image) else {
                    continue;
                };
                frame.draw_image(
                    Rectangle::new(
                        Point::new(sprite.x, sprite.y),
                        Size::new(sprite.width, sprite.height),
                    ),
                    canvas::Image::new(image.handle.clone()),
                );
            }
        });
        vec![geometry]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag_last.is_some() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}
