//! Application state and event loop

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEventKind,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    DefaultTerminal, Frame,
};

use crate::heatmap::layout::Rectf;
use crate::heatmap::render::{plan_frame, HitTarget, PaintQueue, RenderOptions};
use crate::services::{load_market, DataSource};
use crate::types::{MarketData, Sector};

use super::theme::Theme;
use super::widgets::{
    help::HelpPopup,
    legend::Legend,
    spinner::{LoadingStage, Spinner},
    tooltip::{HoverTooltip, StockDetailPopup},
    treemap::TreemapView,
};

/// Quiet period after the last resize before the layout is recomputed.
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

/// Application state
pub enum AppState {
    /// Loading data with spinner animation
    Loading {
        spinner_frame: usize,
        stage: LoadingStage,
    },
    /// Ready with loaded data
    Ready { data: Box<MarketData> },
    /// Error state
    Error { message: String },
}

/// Trailing-edge debounce over an injectable clock. `signal` marks an
/// event, `ready` fires once the quiet period has passed and clears the
/// pending state.
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Main application
pub struct App {
    state: AppState,
    source: DataSource,
    should_quit: bool,
    theme: Theme,
    grouped: bool,
    /// Drilled-in sector (index into the loaded sector list)
    focus: Option<usize>,
    hover: Option<HitTarget>,
    hover_pos: (u16, u16),
    /// Stock detail popup (index into the loaded stock list)
    detail: Option<usize>,
    show_help: bool,
    queue: Option<PaintQueue>,
    generation: u64,
    last_rect: Option<Rectf>,
    debouncer: Debouncer,
    opts: RenderOptions,
    refresh_rx: Option<mpsc::Receiver<Result<MarketData, String>>>,
}

impl App {
    /// Create a new app in loading state
    pub fn new(source: DataSource, grouped: bool, theme: Theme) -> Self {
        Self {
            state: AppState::Loading {
                spinner_frame: 0,
                stage: LoadingStage::Fetching,
            },
            source,
            should_quit: false,
            theme,
            grouped,
            focus: None,
            hover: None,
            hover_pos: (0, 0),
            detail: None,
            show_help: false,
            queue: None,
            generation: 0,
            last_rect: None,
            debouncer: Debouncer::new(RESIZE_DEBOUNCE),
            opts: RenderOptions::default(),
            refresh_rx: None,
        }
    }

    /// Kick off a background snapshot load. No-op while one is in flight.
    pub fn start_refresh(&mut self) {
        if self.refresh_rx.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let source = self.source.clone();
        thread::spawn(move || {
            let result = load_market(&source).map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
        self.refresh_rx = Some(rx);
    }

    /// Check for a finished background load (non-blocking).
    pub fn poll_refresh(&mut self) {
        let Some(rx) = &self.refresh_rx else { return };
        if let Ok(result) = rx.try_recv() {
            self.refresh_rx = None;
            self.apply_data_result(result);
        }
    }

    fn apply_data_result(&mut self, result: Result<MarketData, String>) {
        match result {
            Ok(data) => {
                self.state = AppState::Ready {
                    data: Box::new(data),
                };
                self.focus = None;
                self.hover = None;
                self.detail = None;
                self.invalidate();
            }
            Err(message) => {
                // A failed refresh keeps the last good snapshot on screen.
                if !matches!(self.state, AppState::Ready { .. }) {
                    self.state = AppState::Error { message };
                }
            }
        }
    }

    /// Drop the current plan; the next draw recomputes it immediately.
    fn invalidate(&mut self) {
        self.queue = None;
        self.last_rect = None;
    }

    /// The sector slice the current plan was built against. Drilled-in
    /// mode plans against a single-sector slice, so plan indices match.
    fn planned_sectors<'a>(&self, data: &'a MarketData) -> Option<&'a [Sector]> {
        match self.focus {
            Some(i) => data.sectors.get(i..=i),
            None if self.grouped => Some(&data.sectors),
            None => None,
        }
    }

    /// Make sure the paint queue matches the current tree area. A size
    /// change while a plan exists is debounced; the stale plan keeps
    /// painting until the quiet period passes.
    fn ensure_plan(&mut self, rect: Rectf, now: Instant) {
        if !matches!(self.state, AppState::Ready { .. }) {
            self.queue = None;
            self.last_rect = None;
            return;
        }

        let first = self.queue.is_none();
        if self.last_rect != Some(rect) {
            self.last_rect = Some(rect);
            if !first {
                self.debouncer.signal(now);
            }
        }

        if !first {
            let unchanged = self
                .queue
                .as_ref()
                .map(|q| q.plan().rect == rect)
                .unwrap_or(false);
            if self.debouncer.pending() {
                if !self.debouncer.ready(now) {
                    return;
                }
            } else if unchanged {
                return;
            }
            if unchanged {
                return;
            }
        }

        self.rebuild_plan(rect);
    }

    /// Recompute the layout from scratch and start a fresh reveal. The
    /// generation bump supersedes any in-flight paint.
    fn rebuild_plan(&mut self, rect: Rectf) {
        let AppState::Ready { data } = &self.state else {
            return;
        };
        self.generation += 1;
        let sectors = self.planned_sectors(data);
        let plan = plan_frame(&data.stocks, sectors, rect, &self.opts);
        self.queue = Some(PaintQueue::new(plan, self.generation));
        self.hover = None;
    }

    /// Handle keyboard and mouse events
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    // Peel one layer at a time: help, detail, drill, quit.
                    if self.show_help {
                        self.show_help = false;
                    } else if self.detail.is_some() {
                        self.detail = None;
                    } else if self.focus.is_some() {
                        self.focus = None;
                        self.invalidate();
                    } else {
                        self.should_quit = true;
                    }
                }
                KeyCode::Char('g') => {
                    self.grouped = !self.grouped;
                    self.focus = None;
                    self.invalidate();
                }
                KeyCode::Char('r') => {
                    self.start_refresh();
                }
                KeyCode::Char('?') => {
                    self.show_help = !self.show_help;
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved => {
                    self.hover_pos = (mouse.column, mouse.row);
                    self.hover = self.hit_test(mouse.column, mouse.row);
                }
                MouseEventKind::Down(MouseButton::Left) => {
                    if self.show_help || self.detail.is_some() {
                        return;
                    }
                    match self.hit_test(mouse.column, mouse.row) {
                        Some(HitTarget::Sector(i)) if self.focus.is_none() => {
                            self.focus = Some(i);
                            self.invalidate();
                        }
                        Some(HitTarget::Stock(i)) => {
                            self.detail = Some(i);
                        }
                        _ => {}
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn hit_test(&self, column: u16, row: u16) -> Option<HitTarget> {
        // Probe the center of the terminal cell.
        self.queue
            .as_ref()?
            .plan()
            .hit_test(column as f64 + 0.5, row as f64 + 0.5)
    }

    /// Timer tick: spinner animation, paint batch reveal, refresh poll.
    pub fn tick(&mut self) {
        if let AppState::Loading {
            spinner_frame,
            stage,
        } = &self.state
        {
            let frame = Spinner::next_frame(*spinner_frame);
            // Each full spinner cycle moves the stage line forward.
            let stage = if frame == 0 { stage.next() } else { *stage };
            self.state = AppState::Loading {
                spinner_frame: frame,
                stage,
            };
        }
        if let Some(queue) = &mut self.queue {
            if !queue.complete() {
                queue.advance(self.opts.batch_size);
            }
        }
        self.poll_refresh();
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn areas(area: Rect) -> (Rect, Rect, Rect) {
        let [title, tree, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);
        (title, tree, status)
    }

    fn tree_rectf(area: Rect) -> Rectf {
        Rectf::new(
            area.x as f64,
            area.y as f64,
            area.width as f64,
            area.height as f64,
        )
    }

    /// Draw the application
    pub fn draw(&mut self, frame: &mut Frame) {
        let (_, tree, _) = Self::areas(frame.area());
        self.ensure_plan(Self::tree_rectf(tree), Instant::now());
        frame.render_widget(&*self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title_area, tree_area, status_area) = App::areas(area);

        match &self.state {
            AppState::Loading {
                spinner_frame,
                stage,
            } => {
                Spinner::new(*spinner_frame, *stage).render(area, buf);
            }
            AppState::Ready { data } => {
                self.render_title(data, title_area, buf);

                if let Some(queue) = &self.queue {
                    let sectors = self.planned_sectors(data).unwrap_or(&[]);
                    TreemapView::new(queue, &data.stocks, sectors, self.theme)
                        .render(tree_area, buf);
                }

                Legend::new(self.theme).render(status_area, buf);
                let hint = "g group  r refresh  ? help  q quit";
                if status_area.width as usize > hint.len() + 48 {
                    let x = status_area.right() - hint.len() as u16;
                    buf.set_string(
                        x,
                        status_area.y,
                        hint,
                        Style::default().fg(self.theme.muted()),
                    );
                }

                if let Some(HitTarget::Stock(i)) = self.hover {
                    if self.detail.is_none() && !self.show_help {
                        if let Some(stock) = data.stocks.get(i) {
                            let tip_area = HoverTooltip::anchored_area(
                                self.hover_pos.0,
                                self.hover_pos.1,
                                tree_area,
                            );
                            HoverTooltip::new(stock, self.theme).render(tip_area, buf);
                        }
                    }
                }

                if let Some(i) = self.detail {
                    if let Some(stock) = data.stocks.get(i) {
                        let popup_area = StockDetailPopup::centered_area(area);
                        StockDetailPopup::new(stock, self.theme).render(popup_area, buf);
                    }
                }

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(self.theme).render(popup_area, buf);
                }
            }
            AppState::Error { message } => {
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", message);
                let x = area.x + (area.width.saturating_sub(text.len() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(self.theme.error()));

                let hint = "press r to retry, q to quit";
                let hx = area.x + (area.width.saturating_sub(hint.len() as u16)) / 2;
                buf.set_string(hx, y + 1, hint, Style::default().fg(self.theme.muted()));
            }
        }
    }
}

impl App {
    fn render_title(&self, data: &MarketData, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            Span::styled(
                "marketmap",
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", data.source),
                Style::default().fg(self.theme.muted()),
            ),
            Span::styled(
                format!("  {}", data.as_of.format("%H:%M:%S")),
                Style::default().fg(self.theme.muted()),
            ),
            Span::styled(
                format!("  {} stocks", data.placeable()),
                Style::default().fg(self.theme.muted()),
            ),
        ];
        if let Some(i) = self.focus {
            if let Some(sector) = data.sectors.get(i) {
                spans.push(Span::styled(
                    format!("  \u{25b8} {}", sector.name),
                    Style::default().fg(self.theme.accent()),
                ));
            }
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Run the TUI application
pub fn run(source: DataSource, grouped: bool) -> anyhow::Result<()> {
    // Theme probing talks to the terminal; do it before raw mode.
    let theme = Theme::detect();
    let mut terminal = ratatui::init();
    let _ = crossterm::execute!(std::io::stdout(), EnableMouseCapture);
    let result = run_app(&mut terminal, source, grouped, theme);
    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}

fn run_app(
    terminal: &mut DefaultTerminal,
    source: DataSource,
    grouped: bool,
    theme: Theme,
) -> anyhow::Result<()> {
    let mut app = App::new(source, grouped, theme);
    app.start_refresh();

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // Poll for events with 100ms timeout; the timeout doubles as the
        // spinner/paint-batch tick.
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}
