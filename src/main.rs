mod app;
mod event;
mod logging;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tracing::{debug, info};

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use keychenga::config::Config;
use keychenga::generator::TokenSource;
use keychenga::session::input;
use ui::components::category_select::CategorySelect;
use ui::components::question_area::QuestionArea;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};

#[derive(Parser)]
#[command(
    name = "keychenga",
    version,
    about = "Drill symbols, function keys and shortcut chords"
)]
struct Cli {
    #[arg(short, long, help = "Drill category to practice (repeatable)")]
    category: Vec<String>,

    #[arg(short, long, help = "Maximum width of a question line")]
    limit: Option<usize>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "List available drill categories and exit")]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if !cli.category.is_empty() {
        config.categories = cli.category;
    }
    if let Some(limit) = cli.limit {
        config.question_length_limit = limit;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.validate();

    if cli.list {
        let source = TokenSource::new(Some(Config::drills_dir()));
        for name in source.available() {
            let marker = if config.categories.contains(&name) { "*" } else { " " };
            println!("{marker} {name}");
        }
        println!("\nThemes: {}", ui::theme::Theme::available_themes().join(", "));
        return Ok(());
    }

    let _log_guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("logging disabled: {err}");
            None
        }
    };
    info!(version = env!("CARGO_PKG_VERSION"), "keychenga starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Without disambiguation most terminals cannot report chords such as Ctrl+F5.
    let keyboard_enhanced = execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    )
    .is_ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, events.drill_feedback());
    app.start_drill();

    let result = run_app(&mut terminal, &mut app, &events);
    app.shutdown();

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    info!("keychenga stopped");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Drill(update) => app.view.apply(update),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Drill => handle_drill_key(app, key),
        AppScreen::Select => handle_select_key(app, key),
    }
}

fn handle_drill_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('o') {
        app.open_selection();
        return;
    }
    match input::from_crossterm(&key) {
        Some(raw) => app.offer(raw),
        None => debug!(target: "keychenga::session", ?key, "key has no drill meaning"),
    }
}

fn handle_select_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_selection(),
        KeyCode::Up | KeyCode::Char('k') => app.categories.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.categories.next(),
        KeyCode::Char(' ') => app.categories.toggle(),
        KeyCode::Enter => app.apply_selection(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " keychenga ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", app.config.categories.join(", ")),
            Style::default().fg(colors.text_pending()),
        ),
    ]));
    frame.render_widget(header, layout.header);

    frame.render_widget(QuestionArea::new(&app.view, &app.theme), layout.main);

    let penalties = format!("Penalties: {}", app.view.penalties);
    let hints = ["[Ctrl+O] Drills", "[Ctrl+C] Quit", penalties.as_str()];
    let footer: Vec<Line> = pack_hint_lines(&hints, layout.footer.width as usize)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.text_pending()))))
        .collect();
    Paragraph::new(footer).render(layout.footer, frame.buffer_mut());

    if app.screen == AppScreen::Select {
        let popup = centered_rect(50, 60, area);
        frame.render_widget(CategorySelect::new(&app.categories, &app.theme), popup);
    }
}
