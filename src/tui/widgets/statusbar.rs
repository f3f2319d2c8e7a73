use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, message: Option<&str>) {
    let line = match message {
        Some(msg) => Line::from(Span::styled(msg, theme::amber())),
        None => {
            let hints = [
                ("[↑↓]", " bookmarks  "),
                ("[x]", " remove  "),
                ("[f]", " filter  "),
                ("[r]", " refresh  "),
                ("[?]", " help  "),
                ("[Esc]", " quit"),
            ];
            let spans: Vec<Span> = hints
                .iter()
                .flat_map(|(key, label)| {
                    [Span::styled(*key, theme::gold()), Span::styled(*label, theme::dim())]
                })
                .collect();
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
