use super::body::GridBody;
use super::Grid;

/// Narrowest an auto-sized column may get
pub const MIN_COLUMN_WIDTH: u16 = 4;

pub const DEFAULT_BODY_WIDTH: u16 = 80;

impl<B: GridBody> Grid<B> {
    /// Recompute render widths of the visible columns.
    ///
    /// Fixed-width columns keep their width. Whatever the body has left after
    /// them and one separator per column is split evenly over the auto columns,
    /// with the remainder going to the leftmost ones.
    pub fn adapt_width(&mut self) {
        let mut fixed_total: u32 = 0;
        let mut auto_count: u32 = 0;
        for key in &self.columns {
            match self.arena[key.0].width {
                Some(w) => fixed_total += u32::from(w),
                None => auto_count += 1,
            }
        }

        let separators = self.columns.len() as u32;
        let available = u32::from(self.body_width).saturating_sub(fixed_total + separators);
        let (share, mut remainder) = if auto_count == 0 {
            (0, 0)
        } else {
            (available / auto_count, available % auto_count)
        };

        for key in &self.columns {
            let col = &mut self.arena[key.0];
            col.render_width = match col.width {
                Some(w) => w,
                None => {
                    let extra = if remainder > 0 {
                        remainder -= 1;
                        1
                    } else {
                        0
                    };
                    let w = (share + extra).min(u32::from(u16::MAX)) as u16;
                    w.max(MIN_COLUMN_WIDTH)
                }
            };
        }
    }
}
