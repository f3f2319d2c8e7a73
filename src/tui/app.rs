use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use crate::config::AppConfig;
use crate::db::repository::BookmarkRepo;
use crate::models::{Bookmark, BookmarkKind, PrayerName};
use crate::prayer_times::location::{display_name, UNKNOWN_LOCATION};
use crate::prayer_times::{
    resolve_next, ApiClient, NextPrayer, PrayerTimeTable, ResolvedTable, TableProvider,
    TableSource,
};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{bookmarks, header, next_prayer, prayers, statusbar};
use crate::utils::hijri::hijri_or_local;

const TICK_MS: u64 = 1000;
const REMINDER_SECS: i64 = 60;
const STATUS_TICKS: u8 = 5;

/// A day's table and Hijri date, produced off the UI thread.
#[derive(Debug, Clone)]
pub struct DayLoad {
    pub resolved: ResolvedTable,
    pub hijri: String,
}

/// Loads the day for `date`; the flag skips the cache. Runs on a worker
/// thread since it may block on the network.
pub type DayLoader = Arc<dyn Fn(NaiveDate, bool) -> Result<DayLoad> + Send + Sync>;

/// Loader backed by its own connection to the database at `db_path`.
pub fn network_loader(db_path: PathBuf, config: AppConfig) -> DayLoader {
    Arc::new(move |date, refresh| {
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Opening database at {:?}", db_path))?;
        let client = ApiClient::new();
        let resolved = TableProvider::new(&conn, &client)
            .refresh(refresh)
            .table_for(date, &config.location, &config.prayer)?;
        let hijri = hijri_or_local(|| client.hijri_today(), date, config.location.hijri_offset);
        Ok(DayLoad { resolved, hijri })
    })
}

/// Banner shown after a prayer time begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub prayer: PrayerName,
    pub until: NaiveDateTime,
}

/// The prayer whose time `previous` was counting down to, if that time has
/// been reached within the last minute. Sunrise never triggers a reminder.
pub fn prayer_began(previous: &NextPrayer, now: NaiveDateTime) -> Option<PrayerName> {
    let since = now - previous.at;
    if since >= Duration::zero()
        && since < Duration::seconds(REMINDER_SECS)
        && previous.prayer.is_salah()
    {
        Some(previous.prayer)
    } else {
        None
    }
}

pub struct App {
    pub config: AppConfig,
    loader: DayLoader,
    pending: Option<mpsc::Receiver<Result<DayLoad>>>,
    /// Set when the pending load came from the refresh key
    pending_refresh: bool,
    pub should_quit: bool,
    pub show_help: bool,

    pub resolved: ResolvedTable,
    pub next: NextPrayer,
    pub now: NaiveDateTime,
    pub place: String,
    pub hijri_str: String,
    pub reminder: Option<Reminder>,
    ring_bell: bool,

    pub bookmarks: Vec<Bookmark>,
    pub bookmark_filter: Option<BookmarkKind>,
    pub bookmark_idx: usize,
    pub status_msg: Option<String>,
    status_ticks: u8,
}

impl App {
    pub fn new(config: AppConfig, loader: DayLoader) -> Self {
        let now = Local::now().naive_local();
        let resolved = ResolvedTable {
            date: now.date(),
            table: PrayerTimeTable::fallback(),
            source: TableSource::Fallback,
        };
        let next = resolve_next(&resolved.table, now);

        App {
            config,
            loader,
            pending: None,
            pending_refresh: false,
            should_quit: false,
            show_help: false,
            resolved,
            next,
            now,
            place: UNKNOWN_LOCATION.to_string(),
            hijri_str: String::new(),
            reminder: None,
            ring_bell: false,
            bookmarks: Vec::new(),
            bookmark_filter: None,
            bookmark_idx: 0,
            status_msg: None,
            status_ticks: 0,
        }
    }

    /// Resolve today's table, place name, Hijri date and bookmarks. Blocks;
    /// called once before the terminal is taken over.
    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        let now = Local::now().naive_local();
        let day = (self.loader)(now.date(), false)?;
        self.apply_day(day, now);

        let client = ApiClient::new();
        self.place = display_name(conn, &self.config.location, |lat, lng| {
            client.place_name(lat, lng)
        })?;
        self.reload_bookmarks(conn)?;
        Ok(())
    }

    fn apply_day(&mut self, day: DayLoad, now: NaiveDateTime) {
        self.resolved = day.resolved;
        self.hijri_str = day.hijri;
        self.next = resolve_next(&self.resolved.table, now);
    }

    /// Start loading `date` on a worker thread unless a load is running.
    fn request_day(&mut self, date: NaiveDate, refresh: bool) {
        if self.pending.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let loader = Arc::clone(&self.loader);
        thread::spawn(move || {
            // The app may have quit before the load finished
            let _ = tx.send(loader(date, refresh));
        });
        self.pending = Some(rx);
        self.pending_refresh = refresh;
    }

    fn poll_pending(&mut self, now: NaiveDateTime) {
        let Some(rx) = &self.pending else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(anyhow::anyhow!("Prayer time loader stopped"))
            }
        };
        self.pending = None;

        match result {
            Ok(day) => {
                let source = day.resolved.source;
                self.apply_day(day, now);
                if self.pending_refresh {
                    self.set_status(format!("Prayer times from {}", source.label()));
                }
            }
            Err(e) => {
                log::error!("Loading prayer times: {:#}", e);
                // Keep the current times for the new day rather than retrying every tick
                self.resolved.date = now.date();
                if self.pending_refresh {
                    self.set_status(format!("Refresh failed: {}", e));
                }
            }
        }
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_msg = Some(msg);
        self.status_ticks = STATUS_TICKS;
    }

    pub fn reload_bookmarks(&mut self, conn: &Connection) -> Result<()> {
        self.bookmarks = BookmarkRepo::all(conn)?;
        let len = self.visible_bookmarks().len();
        self.bookmark_idx = self.bookmark_idx.min(len.saturating_sub(1));
        Ok(())
    }

    pub fn visible_bookmarks(&self) -> Vec<&Bookmark> {
        self.bookmarks
            .iter()
            .filter(|b| b.matches(self.bookmark_filter, ""))
            .collect()
    }

    pub fn tick(&mut self) {
        self.tick_at(Local::now().naive_local());
    }

    /// Advance the clock: pick up a finished load, start one on a new day,
    /// recompute the next prayer, and raise or expire the reminder banner.
    /// Never blocks; until the new day's table arrives the previous one is used.
    pub fn tick_at(&mut self, now: NaiveDateTime) {
        self.poll_pending(now);
        if now.date() != self.resolved.date && self.pending.is_none() {
            log::info!("Date changed to {}, loading new prayer times", now.date());
            self.request_day(now.date(), false);
        }

        if self.status_ticks > 0 {
            self.status_ticks -= 1;
            if self.status_ticks == 0 {
                self.status_msg = None;
            }
        }

        if self.config.reminders.prayer_reminders {
            if let Some(prayer) = prayer_began(&self.next, now) {
                if self.reminder.as_ref().map(|r| r.prayer) != Some(prayer) {
                    self.reminder = Some(Reminder {
                        prayer,
                        until: self.next.at + Duration::seconds(REMINDER_SECS),
                    });
                    self.ring_bell = self.config.reminders.bell;
                }
            }
        }
        if self.reminder.as_ref().is_some_and(|r| now >= r.until) {
            self.reminder = None;
        }

        self.now = now;
        self.next = resolve_next(&self.resolved.table, now);
    }

    /// True once per reminder if the bell should ring.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.ring_bell)
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Some terminals also report key release and repeat
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.bookmark_idx = self.bookmark_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = self.visible_bookmarks().len().saturating_sub(1);
                if self.bookmark_idx < max {
                    self.bookmark_idx += 1;
                }
            }
            KeyCode::Char('f') => {
                let kinds = BookmarkKind::all();
                self.bookmark_filter = match self.bookmark_filter {
                    None => kinds.first().copied(),
                    Some(k) => kinds.iter().skip_while(|x| **x != k).nth(1).copied(),
                };
                self.bookmark_idx = 0;
            }
            KeyCode::Char('x') | KeyCode::Delete => self.remove_focused_bookmark(conn),
            KeyCode::Char('r') => {
                if self.pending.is_none() {
                    self.request_day(Local::now().date_naive(), true);
                    self.set_status("Refreshing prayer times…".to_string());
                }
            }
            _ => {}
        }
    }

    fn remove_focused_bookmark(&mut self, conn: &Connection) {
        let Some(id) = self
            .visible_bookmarks()
            .get(self.bookmark_idx)
            .map(|b| b.id.clone())
        else {
            return;
        };
        match BookmarkRepo::remove(conn, &id) {
            Ok(_) => self.set_status("Bookmark removed".to_string()),
            Err(e) => {
                log::error!("Removing bookmark {}: {:#}", id, e);
                self.set_status(format!("Could not remove bookmark: {}", e));
            }
        }
        if let Err(e) = self.reload_bookmarks(conn) {
            log::error!("Reloading bookmarks: {:#}", e);
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let banner_height = if self.reminder.is_some() { 3 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),             // header
                Constraint::Length(banner_height), // reminder
                Constraint::Min(0),                // body
                Constraint::Length(1),             // status bar
            ])
            .split(area);

        header::render(frame, outer[0], &self.hijri_str, &self.place);
        if let Some(reminder) = &self.reminder {
            self.draw_reminder(frame, outer[1], reminder);
        }
        statusbar::render(frame, outer[3], self.status_msg.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer[2]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(0)])
            .split(columns[0]);

        prayers::render(frame, left[0], &self.resolved, &self.next, self.now);
        bookmarks::render(
            frame,
            left[1],
            &self.visible_bookmarks(),
            self.bookmark_idx,
            self.bookmark_filter,
        );

        let right = Rect {
            height: columns[1].height.min(10),
            ..columns[1]
        };
        next_prayer::render(frame, right, &self.next, self.resolved.source);

        if self.show_help {
            self.draw_help_overlay(frame);
        }
    }

    fn draw_reminder(&self, frame: &mut Frame, area: Rect, reminder: &Reminder) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold().add_modifier(Modifier::BOLD))
            .style(theme::banner());
        let text = Line::from(vec![
            Span::styled("☾  ", theme::gold()),
            Span::styled(
                format!("It's time for {}", reminder.prayer.display_name()),
                theme::banner().add_modifier(Modifier::BOLD),
            ),
        ]);
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).max(10),
        }
        .intersection(area);

        frame.render_widget(Clear, popup_area);

        let keys = [
            ("[↑ ↓]  ", "Navigate bookmarks"),
            ("[x]    ", "Remove bookmark"),
            ("[f]    ", "Filter: all / surah / dua / ayah"),
            ("[r]    ", "Refresh prayer times"),
            ("[?]    ", "Toggle help"),
            ("[Esc]  ", "Quit"),
        ];
        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        help_text.extend(keys.iter().map(|(key, label)| {
            Line::from(vec![
                Span::styled(format!("  {}", key), theme::gold()),
                Span::styled(*label, theme::dim()),
            ])
        }));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

fn ring_bell() {
    let mut out = std::io::stdout();
    if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
        log::warn!("Ringing terminal bell: {}", e);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig, db_path: PathBuf) -> Result<()> {
    let loader = network_loader(db_path, config.clone());
    let mut app = App::new(config, loader);
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(TICK_MS);

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &conn);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Resize => {}
                Event::Tick => {
                    app.tick();
                    if app.take_bell() {
                        ring_bell();
                    }
                }
            }
        }
    })();

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use chrono::{NaiveDate, NaiveTime};
    use crossterm::event::KeyEventState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn at(date: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(h, m, s).unwrap())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn canned_loader() -> DayLoader {
        Arc::new(|date, _| {
            Ok(DayLoad {
                resolved: ResolvedTable {
                    date,
                    table: PrayerTimeTable::fallback(),
                    source: TableSource::Offline,
                },
                hijri: "1 Ramadan 1448".to_string(),
            })
        })
    }

    fn app_on(date: NaiveDate, now: NaiveDateTime) -> App {
        app_with(date, now, canned_loader())
    }

    fn app_with(date: NaiveDate, now: NaiveDateTime, loader: DayLoader) -> App {
        let mut app = App::new(AppConfig::default(), loader);
        app.resolved = ResolvedTable {
            date,
            table: PrayerTimeTable::fallback(),
            source: TableSource::Fallback,
        };
        app.now = now;
        app.next = resolve_next(&app.resolved.table, now);
        app
    }

    #[test]
    fn began_only_within_the_minute() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let next = resolve_next(&PrayerTimeTable::fallback(), at(day, 12, 0, 0));
        assert_eq!(next.prayer, PrayerName::Dhuhr);

        assert_eq!(prayer_began(&next, at(day, 12, 29, 59)), None);
        assert_eq!(prayer_began(&next, at(day, 12, 30, 0)), Some(PrayerName::Dhuhr));
        assert_eq!(prayer_began(&next, at(day, 12, 30, 59)), Some(PrayerName::Dhuhr));
        assert_eq!(prayer_began(&next, at(day, 12, 31, 0)), None);
    }

    #[test]
    fn sunrise_never_reminds() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let next = resolve_next(&PrayerTimeTable::fallback(), at(day, 6, 0, 0));
        assert_eq!(next.prayer, PrayerName::Sunrise);
        assert_eq!(prayer_began(&next, at(day, 6, 43, 0)), None);
    }

    #[test]
    fn tick_raises_and_expires_banner() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut app = app_on(day, at(day, 18, 31, 58));

        app.tick_at(at(day, 18, 31, 59));
        assert!(app.reminder.is_none());
        assert_eq!(app.next.prayer, PrayerName::Maghrib);

        app.tick_at(at(day, 18, 32, 0));
        let reminder = app.reminder.clone().unwrap();
        assert_eq!(reminder.prayer, PrayerName::Maghrib);
        assert_eq!(app.next.prayer, PrayerName::Isha);
        assert!(app.take_bell());
        assert!(!app.take_bell());

        app.tick_at(at(day, 18, 32, 30));
        assert!(app.reminder.is_some());

        app.tick_at(at(day, 18, 33, 0));
        assert!(app.reminder.is_none());
    }

    #[test]
    fn reminders_can_be_disabled() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut app = app_on(day, at(day, 18, 31, 59));
        app.config.reminders.prayer_reminders = false;

        app.tick_at(at(day, 18, 32, 0));
        assert!(app.reminder.is_none());
        assert!(!app.take_bell());
    }

    #[test]
    fn bell_follows_setting() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut app = app_on(day, at(day, 19, 59, 59));
        app.config.reminders.bell = false;

        app.tick_at(at(day, 20, 0, 0));
        assert_eq!(app.reminder.as_ref().map(|r| r.prayer), Some(PrayerName::Isha));
        assert!(!app.take_bell());
    }

    #[test]
    fn countdown_shrinks_each_tick() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut app = app_on(day, at(day, 10, 0, 0));
        let before = app.next.remaining.total_seconds();
        app.tick_at(at(day, 10, 0, 1));
        assert_eq!(app.next.remaining.total_seconds(), before - 1);
    }

    #[test]
    fn bookmark_panel_navigates_filters_and_removes() {
        let conn = test_conn();
        BookmarkRepo::save_at(&conn, BookmarkKind::Surah, "Ya-Sin", "36", 1).unwrap();
        BookmarkRepo::save_at(&conn, BookmarkKind::Ayah, "Ayat al-Kursi", "2:255", 2).unwrap();
        BookmarkRepo::save_at(&conn, BookmarkKind::Dua, "Laylat al-Qadr", "12", 3).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut app = app_on(day, at(day, 10, 0, 0));
        app.reload_bookmarks(&conn).unwrap();
        assert_eq!(app.visible_bookmarks().len(), 3);

        app.handle_key(press(KeyCode::Down), &conn);
        app.handle_key(press(KeyCode::Down), &conn);
        app.handle_key(press(KeyCode::Down), &conn);
        assert_eq!(app.bookmark_idx, 2);

        app.handle_key(press(KeyCode::Char('f')), &conn);
        assert_eq!(app.bookmark_filter, Some(BookmarkKind::Surah));
        assert_eq!(app.visible_bookmarks().len(), 1);

        app.handle_key(press(KeyCode::Char('x')), &conn);
        assert!(app.visible_bookmarks().is_empty());
        assert_eq!(BookmarkRepo::all(&conn).unwrap().len(), 2);

        app.handle_key(press(KeyCode::Char('f')), &conn);
        app.handle_key(press(KeyCode::Char('f')), &conn);
        app.handle_key(press(KeyCode::Char('f')), &conn);
        assert_eq!(app.bookmark_filter, None);
        assert_eq!(app.visible_bookmarks().len(), 2);
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let conn = test_conn();
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut app = app_on(day, at(day, 10, 0, 0));

        app.handle_key(press(KeyCode::Char('?')), &conn);
        assert!(app.show_help);
        app.handle_key(press(KeyCode::Char('q')), &conn);
        assert!(!app.should_quit);
        app.handle_key(press(KeyCode::Esc), &conn);
        assert!(!app.show_help);
        app.handle_key(press(KeyCode::Char('q')), &conn);
        assert!(app.should_quit);
    }

    // Ticks until the pending load has been picked up, or gives up after ~5 s.
    fn settle(app: &mut App, now: NaiveDateTime) {
        for _ in 0..500 {
            app.tick_at(now);
            if app.pending.is_none() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        panic!("load never finished");
    }

    #[test]
    fn new_day_loads_off_the_tick() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let gate = Mutex::new(gate_rx);
        let counted = Arc::clone(&calls);
        let loader: DayLoader = Arc::new(move |date, _| {
            counted.fetch_add(1, Ordering::SeqCst);
            gate.lock().unwrap().recv()?;
            Ok(DayLoad {
                resolved: ResolvedTable {
                    date,
                    table: PrayerTimeTable::fallback(),
                    source: TableSource::Api,
                },
                hijri: "2 Ramadan 1448".to_string(),
            })
        });

        let day1 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut app = app_with(day1, at(day1, 23, 59, 59), loader);

        // The loader is blocked, yet every tick returns and counts down
        app.tick_at(at(day2, 0, 0, 0));
        app.tick_at(at(day2, 0, 0, 1));
        assert_eq!(app.resolved.date, day1);
        assert_eq!(app.next.prayer, PrayerName::Fajr);
        assert!(!app.next.tomorrow);
        assert_eq!(app.next.remaining.to_string(), "5h 11m 59s");

        gate_tx.send(()).unwrap();
        settle(&mut app, at(day2, 0, 0, 2));
        assert_eq!(app.resolved.date, day2);
        assert_eq!(app.resolved.source, TableSource::Api);
        assert_eq!(app.hijri_str, "2 Ramadan 1448");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_day_load_is_not_retried_every_tick() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let loader: DayLoader = Arc::new(move |_, _| {
            counted.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("database is locked"))
        });

        let day1 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut app = app_with(day1, at(day1, 23, 59, 59), loader);

        app.tick_at(at(day2, 0, 0, 0));
        settle(&mut app, at(day2, 0, 0, 1));
        app.tick_at(at(day2, 0, 0, 2));
        app.tick_at(at(day2, 0, 0, 3));
        assert_eq!(app.resolved.date, day2);
        assert_eq!(app.resolved.table, PrayerTimeTable::fallback());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn status_message_clears_after_a_few_ticks() {
        let conn = test_conn();
        BookmarkRepo::save_at(&conn, BookmarkKind::Surah, "Al-Mulk", "67", 1).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut app = app_on(day, at(day, 10, 0, 0));
        app.reload_bookmarks(&conn).unwrap();

        app.handle_key(press(KeyCode::Char('x')), &conn);
        assert_eq!(app.status_msg.as_deref(), Some("Bookmark removed"));

        for s in 1..STATUS_TICKS as u32 {
            app.tick_at(at(day, 10, 0, s));
            assert!(app.status_msg.is_some());
        }
        app.tick_at(at(day, 10, 0, STATUS_TICKS as u32));
        assert!(app.status_msg.is_none());
    }

    #[test]
    fn refresh_key_reports_the_source() {
        let conn = test_conn();
        let day = Local::now().date_naive();
        let now = at(day, 10, 0, 0);
        let mut app = app_on(day, now);

        app.handle_key(press(KeyCode::Char('r')), &conn);
        assert!(app.status_msg.as_deref().unwrap().starts_with("Refreshing"));
        settle(&mut app, now);
        assert_eq!(app.resolved.source, TableSource::Offline);
        assert_eq!(
            app.status_msg.as_deref(),
            Some("Prayer times from calculated offline")
        );
    }
}
