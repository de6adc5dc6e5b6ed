use ratatui::{
    buffer::Buffer,
    layout::Flex,
    layout::{Alignment, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

type KeyGroup = (&'static str, &'static [(&'static str, &'static str)]);

static KEY_GROUPS: &[KeyGroup] = &[
    (
        "Swiping",
        &[
            ("h, LEFT", "Swipe to the previous page"),
            ("l, RIGHT", "Swipe to the next page"),
            ("0, HOME", "Scroll to today"),
        ],
    ),
    (
        "Selecting",
        &[
            ("p", "Select the previous day"),
            ("n", "Select the next day"),
            ("t", "Select today"),
            ("g", "Input date to select"),
        ],
    ),
    ("View", &[("v", "Switch between week and month")]),
    ("Other", &[("?", "Show this help"), ("q, ESC", "Quit")]),
];

/// Columns between the start of a key and the start of its description
const KEY_COLUMN: usize = 12;

const DISMISS: &str = "Press the Any Key to dismiss.";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Help {
    fn text(self) -> Text<'static> {
        let heading = self.0.add_modifier(Modifier::BOLD);
        let mut lines = Vec::new();
        for (i, &(title, keys)) in KEY_GROUPS.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(title, heading)));
            for &(key, description) in keys {
                lines.push(Line::raw(format!("  {key:KEY_COLUMN$}{description}")));
            }
        }
        lines.push(Line::default());
        lines.push(Line::raw(DISMISS));
        Text::from(lines)
    }
}

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = self.text();
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .min(area.height)
            .saturating_add(2);
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .min(area.width)
            .saturating_add(2);
        let para = Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Commands ")
                    .title_alignment(Alignment::Center),
            )
            .style(self.0);
        let [help_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [help_area] = Layout::vertical([height])
            .flex(Flex::Center)
            .areas(help_area);
        let outer_area = Rect {
            x: help_area.x.saturating_sub(1),
            y: help_area.y,
            width: help_area.width.saturating_add(2),
            height: help_area.height,
        };
        Clear.render(outer_area, buf);
        Block::new().style(self.0).render(outer_area, buf);
        para.render(help_area, buf);
    }
}
