use crate::registry::PageData;
use crate::sync::index_to_f64;
use crate::theme::ThemeConfig;

/// Height of a page showing `rows` week rows
pub fn height_of(rows: u8, theme: &ThemeConfig) -> f64 {
    let rows_f = f64::from(rows);
    let gaps = f64::from(rows.saturating_sub(1));
    let body = gaps.mul_add(
        theme.page_between_rows,
        rows_f * theme.day_container_size,
    );
    theme.page_padding_top + theme.page_padding_bottom + body
}

/// How page heights are determined
#[derive(Clone, Copy, Debug, Default)]
pub enum PageHeight {
    /// Computed from the row count and the theme metrics
    #[default]
    Theme,
    /// Every page has the same height
    Fixed(f64),
    /// Computed by the embedder from the theme and the row count
    Custom(fn(&ThemeConfig, u8) -> f64),
}

impl PageHeight {
    pub fn resolve(self, rows: u8, theme: &ThemeConfig) -> f64 {
        match self {
            PageHeight::Theme => height_of(rows, theme),
            PageHeight::Fixed(h) => h,
            PageHeight::Custom(f) => f(theme, rows),
        }
    }
}

/// Piecewise-linear map from a continuous page position to a height, built
/// from the measured heights of mounted pages
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeightTable {
    inputs: Vec<f64>,
    outputs: Vec<f64>,
}

impl HeightTable {
    pub fn new() -> HeightTable {
        HeightTable::default()
    }

    /// Rebuilds the table from `pages` (all of one type) if the sorted
    /// `(array index, height)` pairs differ from the current ones.  Returns
    /// `true` if the table changed.
    pub fn update(&mut self, pages: &[PageData]) -> bool {
        let mut pairs: Vec<(usize, f64)> = pages
            .iter()
            .map(|p| (p.array_index, p.page_height))
            .collect();
        pairs.sort_by_key(|&(i, _)| i);
        let inputs: Vec<f64> = pairs.iter().map(|&(i, _)| index_to_f64(i)).collect();
        let outputs: Vec<f64> = pairs.iter().map(|&(_, h)| h).collect();
        if inputs == self.inputs && outputs == self.outputs {
            return false;
        }
        self.inputs = inputs;
        self.outputs = outputs;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Height at `progress`.  `None` while no height is known; with one known
    /// height that height; otherwise linear between the bracketing entries,
    /// with `progress` clamped to the known indices.
    pub fn interpolated_height(&self, progress: f64) -> Option<f64> {
        let (&lo, &hi) = (self.inputs.first()?, self.inputs.last()?);
        if self.inputs.len() == 1 {
            return self.outputs.first().copied();
        }
        let x = if progress.is_nan() {
            lo
        } else {
            progress.clamp(lo, hi)
        };
        let last_seg = self.inputs.len() - 2;
        let seg = self
            .inputs
            .windows(2)
            .position(|w| matches!(w, [_, b] if x <= *b))
            .unwrap_or(last_seg);
        let (x0, x1) = (*self.inputs.get(seg)?, *self.inputs.get(seg + 1)?);
        let (y0, y1) = (*self.outputs.get(seg)?, *self.outputs.get(seg + 1)?);
        let span = x1 - x0;
        if span <= 0.0 {
            return Some(y0);
        }
        Some((y1 - y0).mul_add((x - x0) / span, y0))
    }
}
