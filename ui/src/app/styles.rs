use iced::{Background, Border, Color, Theme, Vector};

use mmflink_core::NoticeKind;

use super::helpers::notice_color;

#[derive(Debug, Clone, Copy)]
pub(crate) struct HostTabStyle {
    pub(crate) active: bool,
}

/// Pill shaped tab: filled with the primary colour when selected, outlined otherwise.
impl iced::widget::button::StyleSheet for HostTabStyle {
    type Style = Theme;

    fn active(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        let palette = style.extended_palette();
        let (background, text_color, border_color) = if self.active {
            (
                Some(Background::Color(palette.primary.base.color)),
                palette.primary.base.text,
                palette.primary.base.color,
            )
        } else {
            (None, palette.background.base.text, palette.background.strong.color)
        };

        iced::widget::button::Appearance {
            background,
            text_color,
            border: Border {
                color: border_color,
                width: 1.0,
                radius: 999.0.into(),
            },
            ..iced::widget::button::Appearance::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        let mut appearance = self.active(style);
        if !self.active {
            appearance.background =
                Some(Background::Color(style.extended_palette().background.weak.color));
        }
        appearance
    }
}

/// Flat text button used for the close cross on notices.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinkButtonStyle {
    pub(crate) color: Color,
}

impl iced::widget::button::StyleSheet for LinkButtonStyle {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> iced::widget::button::Appearance {
        iced::widget::button::Appearance {
            background: None,
            text_color: self.color,
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 0.0.into(),
            },
            shadow_offset: Vector::new(0.0, 0.0),
            ..iced::widget::button::Appearance::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct NoticeStyle {
    pub(crate) kind: NoticeKind,
}

impl iced::widget::container::StyleSheet for NoticeStyle {
    type Style = Theme;

    fn appearance(&self, style: &Self::Style) -> iced::widget::container::Appearance {
        let palette = style.extended_palette();
        iced::widget::container::Appearance {
            text_color: Some(palette.background.base.text),
            background: Some(Background::Color(palette.background.weak.color)),
            border: Border {
                color: notice_color(self.kind),
                width: 2.0,
                radius: 6.0.into(),
            },
            ..iced::widget::container::Appearance::default()
        }
    }
}

/// Highlighted panel for the bed-clear prompt.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PromptStyle;

impl iced::widget::container::StyleSheet for PromptStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> iced::widget::container::Appearance {
        iced::widget::container::Appearance {
            text_color: Some(Color::from_rgb8(0x10, 0x1a, 0x24)),
            background: Some(Background::Color(Color::from_rgb8(0xff, 0xf4, 0xd6))),
            border: Border {
                color: Color::from_rgb8(0xe0, 0xb0, 0x4f),
                width: 2.0,
                radius: 8.0.into(),
            },
            ..iced::widget::container::Appearance::default()
        }
    }
}
