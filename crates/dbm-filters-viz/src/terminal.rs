use std::io::{self, IsTerminal, Result, Write};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{queue, terminal};
use image::{Rgb, RgbImage};

const UPPER_HALF_BLOCK: char = '\u{2580}';

pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        terminal::disable_raw_mode().ok();
    }
}

/// Draws `img` with two pixel rows per text row, downsampled to fit the
/// terminal, then blocks until a key is pressed.
pub fn show(img: &RgbImage, title: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    let interactive = stdout.is_terminal();

    let (term_cols, term_rows) = terminal::size().unwrap_or((80, 24));
    let step = downsample_step(
        img.dimensions(),
        (u32::from(term_cols), u32::from(term_rows).saturating_sub(2)),
    );

    queue!(stdout, Print(title), Print("\n"))?;

    let (width, height) = img.dimensions();
    for y in (0..height).step_by(2 * step as usize) {
        for x in (0..width).step_by(step as usize) {
            let top = img.get_pixel(x, y);
            let bottom = if y + step < height {
                *img.get_pixel(x, y + step)
            } else {
                Rgb([0, 0, 0])
            };
            queue!(
                stdout,
                SetForegroundColor(to_color(*top)),
                SetBackgroundColor(to_color(bottom)),
                Print(UPPER_HALF_BLOCK)
            )?;
        }
        queue!(stdout, ResetColor, Print("\n"))?;
    }

    if interactive {
        queue!(stdout, Print("Press any key to continue"))?;
    }
    stdout.flush()?;

    if interactive {
        let _guard = RawModeGuard::enable()?;
        wait_for_key()?;
    }

    queue!(stdout, Print("\n"))?;
    stdout.flush()
}

fn wait_for_key() -> Result<()> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}

fn to_color(Rgb([r, g, b]): Rgb<u8>) -> Color {
    Color::Rgb { r, g, b }
}

/// Smallest pixel stride that fits `(width, height)` into `cols` characters
/// and `rows` lines of two pixels each.
pub fn downsample_step((width, height): (u32, u32), (cols, rows): (u32, u32)) -> u32 {
    let cols = cols.max(1);
    let rows = rows.max(1);

    width.div_ceil(cols).max(height.div_ceil(2 * rows)).max(1)
}
