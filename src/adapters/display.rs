//! Log-backed character display.
//!
//! Keeps a shadow copy of the 20x4 screen and logs every row that
//! changes.  On boards without the LCD fitted this is the display; with
//! the LCD it mirrors the panel onto the serial console.

use log::{debug, info, warn};

use crate::app::ports::{DISPLAY_COLUMNS, DISPLAY_ROWS, Display};

const COLUMNS: usize = DISPLAY_COLUMNS as usize;
const ROWS: usize = DISPLAY_ROWS as usize;

/// One rendered row (a glyph may take up to 4 bytes).
pub type RowText = heapless::String<{ COLUMNS * 4 }>;

pub struct LogDisplay {
    cells: [[char; COLUMNS]; ROWS],
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            cells: [[' '; COLUMNS]; ROWS],
        }
    }

    /// Current content of row `y`, glyphs included.
    pub fn row(&self, y: usize) -> RowText {
        let mut text = RowText::new();
        if let Some(cells) = self.cells.get(y) {
            for &c in cells {
                // Capacity covers the widest possible row.
                let _ = text.push(c);
            }
        }
        text
    }
}

impl Display for LogDisplay {
    fn clear_display(&mut self) {
        self.cells = [[' '; COLUMNS]; ROWS];
        debug!("LCD: clear");
    }

    fn display_text(&mut self, x: u8, y: u8, text: &str) {
        let Some(cells) = self.cells.get_mut(usize::from(y)) else {
            warn!("LCD: row {} out of range", y);
            return;
        };
        for (cell, c) in cells.iter_mut().skip(usize::from(x)).zip(text.chars()) {
            *cell = c;
        }
        info!("LCD {}: |{}|", y, self.row(usize::from(y)));
    }
}
