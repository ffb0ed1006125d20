//! Gallery Example - Scroll reveals, staggered cards and a carousel
//!
//! This example demonstrates the controllers driving a terminal page:
//! - Sections fade in as they scroll into view
//! - Gallery cards appear one after another, each with its own tilt
//! - A testimonial carousel autoplays and follows arrow keys and mouse drags
//! - The header switches to compact mode once the page has scrolled
//!
//! Keys: Up/Down or the wheel scroll, Left/Right navigate, 1-9 jump,
//! Esc pauses autoplay, q or Ctrl+C quits.
//!
//! Run with: cargo run --example gallery
//! Logs: RUST_LOG=spark_motion=debug cargo run --example gallery 2> motion.log

use std::io::{self, stdout, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{Event, KeyCode, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing_subscriber::EnvFilter;

use spark_motion::input::{disable_mouse, enable_mouse, poll_event};
use spark_motion::{
    apply_to_carousel, assign_angles, Bounds, CarouselController, CarouselOptions, ElementId,
    FrameClock, GeometryViewport, MotionInput, RevealOptions, RevealTracker, ScrollFlag,
    StaggerOptions, StaggerTracker, TerminalInput, DEFAULT_TILT_RANGE,
};

const HERO: ElementId = ElementId(1);
const ABOUT: ElementId = ElementId(2);
const GALLERY: ElementId = ElementId(3);
const TESTIMONIALS: ElementId = ElementId(4);

const CARDS: usize = 6;

struct Section {
    id: ElementId,
    title: &'static str,
    bounds: Bounds,
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, Hide)?;
    enable_mouse()?;

    let result = run();

    let _ = disable_mouse();
    execute!(stdout(), Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    result
}

fn run() -> io::Result<()> {
    let input = TerminalInput::default();
    let (cols, rows) = terminal::size()?;

    let clock = Rc::new(FrameClock::new());
    let viewport = GeometryViewport::new(
        cols as f32 * input.cell_width,
        rows as f32 * input.cell_height,
    );

    let sections = [
        Section {
            id: HERO,
            title: "Hero",
            bounds: Bounds::new(0.0, 0.0, 640.0, 160.0),
        },
        Section {
            id: ABOUT,
            title: "About",
            bounds: Bounds::new(0.0, 480.0, 640.0, 240.0),
        },
        Section {
            id: GALLERY,
            title: "Gallery",
            bounds: Bounds::new(0.0, 960.0, 640.0, 320.0),
        },
        Section {
            id: TESTIMONIALS,
            title: "Testimonials",
            bounds: Bounds::new(0.0, 1520.0, 640.0, 160.0),
        },
    ];
    viewport.set_layout(sections.iter().map(|s| (s.id, s.bounds)));
    viewport.set_child_count(GALLERY, CARDS);

    let port = Rc::new(viewport.clone());

    let reveals = [HERO, ABOUT, TESTIMONIALS]
        .into_iter()
        .map(|id| {
            let tracker = RevealTracker::new(
                RevealOptions::with_delay(150),
                port.clone(),
                clock.clone(),
            )
            .map_err(io::Error::other)?;
            tracker.attach(Some(id));
            Ok((id, tracker))
        })
        .collect::<io::Result<Vec<_>>>()?;

    let cards = StaggerTracker::new(
        StaggerOptions {
            stagger_delay_ms: 150,
            initial_delay_ms: 200,
            ..Default::default()
        },
        port.clone(),
        clock.clone(),
    )
    .map_err(io::Error::other)?;
    cards.attach(Some(GALLERY));
    let tilts = assign_angles(CARDS, DEFAULT_TILT_RANGE, 7);

    let carousel = CarouselController::new(
        vec![
            "\"It just works.\"",
            "\"Smooth as anything.\"",
            "\"Our landing page finally moves.\"",
        ],
        CarouselOptions {
            autoplay: true,
            autoplay_interval_ms: 3000,
            ..Default::default()
        },
        clock.clone(),
    )
    .map_err(io::Error::other)?;

    let header = ScrollFlag::default();

    loop {
        clock.pump();
        header.update(viewport.scroll().1);

        draw(
            &viewport,
            &input,
            &sections,
            |id| {
                reveals
                    .iter()
                    .find(|(tracked, _)| *tracked == id)
                    .map(|(_, tracker)| tracker.is_in_view())
            },
            &cards,
            tilts.as_slice(),
            &carousel,
            &header,
        )?;

        let Some(event) = poll_event(Duration::from_millis(16))? else {
            continue;
        };
        if let Event::Key(key) = &event {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(());
            }
        }

        match input.convert(event, carousel.reading_direction()) {
            MotionInput::Quit => return Ok(()),
            MotionInput::Scroll(dy) => {
                let (_, y) = viewport.scroll();
                viewport.set_scroll(0.0, (y + dy).max(0.0));
            }
            MotionInput::Resize(w, h) => viewport.set_viewport_size(
                w as f32 * input.cell_width,
                h as f32 * input.cell_height,
            ),
            MotionInput::Dismiss => {
                if carousel.is_paused() {
                    carousel.resume();
                } else {
                    carousel.pause();
                }
            }
            other => {
                apply_to_carousel(&carousel, other);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw(
    viewport: &GeometryViewport,
    input: &TerminalInput,
    sections: &[Section],
    revealed: impl Fn(ElementId) -> Option<bool>,
    cards: &StaggerTracker,
    tilts: &[f32],
    carousel: &CarouselController<&'static str>,
    header: &ScrollFlag,
) -> io::Result<()> {
    let mut out = stdout();
    let (_, scroll_y) = viewport.scroll();
    let screen_rows = (viewport.viewport_bounds().size.height / input.cell_height) as i32;

    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    let title = if header.is_scrolled() {
        "spark-motion".to_string()
    } else {
        format!("=== spark-motion gallery === scroll {scroll_y:.0}px")
    };
    queue!(out, Print(title))?;

    for section in sections {
        let row = ((section.bounds.location.y - scroll_y) / input.cell_height) as i32 + 2;
        if row < 2 || row >= screen_rows {
            continue;
        }
        queue!(out, MoveTo(2, row as u16))?;

        let line = match section.id {
            GALLERY => {
                let shown: Vec<String> = (0..CARDS)
                    .map(|i| {
                        if cards.is_child_revealed(i) {
                            format!("[{:+.1}]", tilts[i])
                        } else {
                            "[ .. ]".to_string()
                        }
                    })
                    .collect();
                format!("{}: {}", section.title, shown.join(" "))
            }
            TESTIMONIALS if revealed(section.id) == Some(true) => {
                let dots: String = (0..carousel.len())
                    .map(|i| if carousel.is_dot_active(i) { 'o' } else { '.' })
                    .collect();
                format!(
                    "{}: {} {} {:>3.0}%{}",
                    section.title,
                    carousel.active_item().unwrap_or_default(),
                    dots,
                    carousel.progress() * 100.0,
                    if carousel.is_paused() { " (paused)" } else { "" },
                )
            }
            id => match revealed(id) {
                Some(true) => format!("{} (visible)", section.title),
                _ => "...".to_string(),
            },
        };
        queue!(out, Print(line))?;
    }

    out.flush()
}
