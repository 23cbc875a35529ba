use std::io::{self, Stdout};

use ratatui::buffer::Buffer;
use ratatui::crossterm;
use ratatui::layout::Rect;
use ratatui::prelude::CrosstermBackend;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use tracing::warn;

use crate::monitor::framebuffer::{Framebuffer, Pixel};
use crate::monitor::tracker::{Frame, Presenter};

/// Draws a framebuffer scaled to the target area, two pixel rows per cell
/// using upper half blocks.
pub struct FrameView<'a> {
    framebuffer: &'a Framebuffer,
}

impl<'a> FrameView<'a> {
    pub fn new(framebuffer: &'a Framebuffer) -> Self {
        Self { framebuffer }
    }
}

fn color(pixel: Pixel) -> Color {
    Color::Rgb(pixel.red, pixel.green, pixel.blue)
}

impl<'a> Widget for FrameView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fb = self.framebuffer;
        if area.is_empty() || fb.width() == 0 || fb.height() == 0 {
            return;
        }
        let rows = area.height as usize * 2;
        let cols = area.width as usize;

        for cy in 0..area.height {
            // Both rows are below fb.height() since cy * 2 + 1 < rows
            let top = fb.row(cy as usize * 2 * fb.height() / rows);
            let bottom = fb.row((cy as usize * 2 + 1) * fb.height() / rows);
            for cx in 0..area.width {
                let x = cx as usize * fb.width() / cols;
                let (upper, lower) = (top[x], bottom[x]);
                if let Some(cell) = buf.cell_mut((area.left() + cx, area.top() + cy)) {
                    cell.set_symbol("▀")
                        .set_fg(color(upper))
                        .set_bg(color(lower));
                }
            }
        }
    }
}

/// Presents each frame in the terminal, with a status line underneath.
pub struct TuiPresenter {
    terminal: ratatui::Terminal<CrosstermBackend<Stdout>>,
}

impl TuiPresenter {
    pub fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen,)?;
        let mut terminal = ratatui::Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.clear()?;
        Ok(Self { terminal })
    }
}

impl Drop for TuiPresenter {
    fn drop(&mut self) {
        _ = crossterm::terminal::disable_raw_mode();
        _ = crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen,);
    }
}

impl Presenter for TuiPresenter {
    fn present(&mut self, frame: &Frame<'_>) {
        let result = self.terminal.draw(|f| {
            let area = f.area();
            let image = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };
            f.render_widget(FrameView::new(frame.framebuffer), image);

            let style = if frame.violations.is_empty() {
                Style::default().fg(Color::LightBlue)
            } else {
                Style::default().fg(Color::LightRed)
            };
            let status = Line::from(vec![
                Span::raw(format!("frame {} ", frame.number)),
                Span::styled(format!("violations {:#06x}", frame.violations.bits()), style),
            ]);
            let status_area = Rect {
                y: area.bottom().saturating_sub(1),
                height: area.height.min(1),
                ..area
            };
            f.render_widget(status, status_area);
        });
        if let Err(e) = result {
            warn!("Failed to draw frame {}: {}", frame.number, e);
        }
    }
}
