//! One-row trend sparkline used by the forecast panels

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different levels (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A one-row sparkline scaled between the lowest and highest value
///
/// Each value takes `cell_width` columns so the bars line up with day columns.
pub struct TempSparkline<'a> {
    values: &'a [i32],
    cell_width: u16,
    /// Values from this index on are drawn with `projected_style`
    projected_from: Option<usize>,
    style: Style,
    projected_style: Style,
}

impl<'a> TempSparkline<'a> {
    pub fn new(values: &'a [i32]) -> Self {
        Self {
            values,
            cell_width: 1,
            projected_from: None,
            style: Style::default().fg(Color::Cyan),
            projected_style: Style::default().fg(Color::Magenta),
        }
    }

    pub fn cell_width(mut self, width: u16) -> Self {
        self.cell_width = width.max(1);
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn projected_from(mut self, index: usize) -> Self {
        self.projected_from = Some(index);
        self
    }

    fn range(&self) -> (i32, i32) {
        let min = self.values.iter().copied().min().unwrap_or(0);
        let max = self.values.iter().copied().max().unwrap_or(0);
        (min, max)
    }

    fn value_to_block(&self, value: i32) -> char {
        let (min, max) = self.range();
        if max == min {
            return BLOCKS[3];
        }
        let normalized = (f64::from(value - min) / f64::from(max - min)).clamp(0.0, 1.0);
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for TempSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for (i, value) in self.values.iter().enumerate() {
            let start = i as u16 * self.cell_width;
            if start >= area.width {
                break;
            }

            let block = self.value_to_block(*value);
            let style = match self.projected_from {
                Some(from) if i >= from => self.projected_style,
                _ => self.style,
            };

            let end = (start + self.cell_width).min(area.width);
            for x in start..end {
                if let Some(cell) = buf.cell_mut((area.x + x, area.y)) {
                    cell.set_char(block).set_style(style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes_map_to_lowest_and_highest_block() {
        let values = [10, 20, 30];
        let sparkline = TempSparkline::new(&values);
        assert_eq!(sparkline.value_to_block(10), '▁');
        assert_eq!(sparkline.value_to_block(30), '█');
    }

    #[test]
    fn test_flat_series_uses_middle_block() {
        let values = [22, 22, 22];
        let sparkline = TempSparkline::new(&values);
        assert_eq!(sparkline.value_to_block(22), '▄');
    }

    #[test]
    fn test_render_fills_cells_per_value() {
        let values = [0, 7];
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);

        TempSparkline::new(&values)
            .cell_width(3)
            .projected_from(1)
            .render(area, &mut buf);

        let symbols: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert_eq!(symbols, "▁▁▁███");
        assert_eq!(buf.content()[4].fg, Color::Magenta);
        assert_eq!(buf.content()[0].fg, Color::Cyan);
    }

    #[test]
    fn test_custom_style_applies_to_every_cell() {
        let values = [40, 60, 80];
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);

        TempSparkline::new(&values)
            .style(Style::default().fg(Color::Blue))
            .render(area, &mut buf);

        assert!(buf.content().iter().all(|cell| cell.fg == Color::Blue));
    }

    #[test]
    fn test_render_truncates_to_area() {
        let values = [1, 2, 3, 4, 5, 6, 7];
        let area = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(area);

        TempSparkline::new(&values).cell_width(2).render(area, &mut buf);

        let symbols: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert_eq!(symbols.chars().count(), 4);
    }
}
