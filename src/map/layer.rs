// SPDX-License-Identifier: MPL-2.0
//! Symbol layers: named rendering rules bound to a source.

use crate::map::expression::{Expression, Properties};

/// A symbol layer draws an icon for every feature of its source that
/// passes the layer filter. Layers without a filter accept everything.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolLayer {
    id: String,
    source: String,
    icon_image: Option<String>,
    icon_size: f32,
    filter: Option<Expression>,
}

impl SymbolLayer {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            icon_image: None,
            icon_size: 1.0,
            filter: None,
        }
    }

    /// References a named image from the style's image registry.
    #[must_use]
    pub fn with_icon_image(mut self, name: impl Into<String>) -> Self {
        self.icon_image = Some(name.into());
        self
    }

    /// Scale factor applied to the icon's natural size.
    #[must_use]
    pub fn with_icon_size(mut self, size: f32) -> Self {
        self.icon_size = size;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Expression) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn icon_image(&self) -> Option<&str> {
        self.icon_image.as_deref()
    }

    pub fn icon_size(&self) -> f32 {
        self.icon_size
    }

    pub fn filter(&self) -> Option<&Expression> {
        self.filter.as_ref()
    }

    /// Whether a feature with the given properties is rendered by this
    /// layer.
    pub fn allows(&self, properties: &Properties) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |filter| filter.matches(properties))
    }
}
