use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::prayer_times::{NextPrayer, TableSource};
use crate::tui::theme;

const SOON_SECS: i64 = 10 * 60;

pub fn render(frame: &mut Frame, area: Rect, next: &NextPrayer, source: TableSource) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let source_style = match source {
        TableSource::Api | TableSource::Cache => theme::dim(),
        TableSource::Offline | TableSource::Fallback => theme::amber(),
    };

    let countdown_style = if next.remaining.total_seconds() < SOON_SECS {
        theme::green().add_modifier(Modifier::BOLD)
    } else {
        theme::amber().add_modifier(Modifier::BOLD)
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", next.name().to_uppercase()),
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  at  ", theme::dim()),
            Span::styled(next.display_time(), theme::bold()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  in  ", theme::dim()),
            Span::styled(next.remaining.to_string(), countdown_style),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!("  {}", source.label()), source_style)),
    ];

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
