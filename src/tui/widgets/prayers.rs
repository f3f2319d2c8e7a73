use chrono::NaiveDateTime;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::prayer_times::{NextPrayer, ResolvedTable};
use crate::tui::theme;
use crate::utils::format::{format_12h, format_24h};

/// Today's six entries; passed ones dimmed, the upcoming one highlighted.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    resolved: &ResolvedTable,
    next: &NextPrayer,
    now: NaiveDateTime,
) {
    let block = Block::default()
        .title(Span::styled(" Prayer Times ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let items: Vec<ListItem> = resolved
        .table
        .entries()
        .map(|(prayer, time)| {
            let is_next = !next.tomorrow && prayer == next.prayer;
            let passed = resolved.date.and_time(time) <= now;

            let (icon, style) = if is_next {
                ("▸", theme::gold().add_modifier(Modifier::BOLD))
            } else if passed {
                ("·", theme::dim())
            } else if prayer.is_salah() {
                (" ", theme::bold())
            } else {
                (" ", theme::green())
            };

            let line = Line::from(vec![
                Span::styled(format!(" {} ", icon), style),
                Span::styled(format!("{:<9}", prayer.display_name()), style),
                Span::styled(format!("{:<7}", format_24h(time)), style),
                Span::styled(format_12h(time), if passed { theme::dim() } else { theme::amber() }),
            ]);

            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
