use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

use crate::models::{Bookmark, BookmarkKind};
use crate::tui::theme;
use crate::utils::format::{pad, truncate};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    bookmarks: &[&Bookmark],
    selected: usize,
    filter: Option<BookmarkKind>,
) {
    let title = match filter {
        Some(kind) => format!(" Bookmarks · {} ", kind),
        None => " Bookmarks ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(!bookmarks.is_empty()))
        .style(theme::surface());

    if bookmarks.is_empty() {
        let empty = ListItem::new(Line::from(Span::styled("  No bookmarks", theme::dim())));
        frame.render_widget(List::new(vec![empty]).block(block), area);
        return;
    }

    let title_width = (area.width as usize).saturating_sub(26).max(8);
    let items: Vec<ListItem> = bookmarks
        .iter()
        .map(|b| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("  {}", pad(b.kind.as_str(), 6)), theme::dim()),
                Span::styled(pad(&truncate(&b.title, title_width), title_width), theme::bold()),
                Span::styled(format!("  {}", b.reference), theme::amber()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::gold().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}
