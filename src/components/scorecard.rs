use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Style;
use tui::widgets::Widget;

/// Rows per glyph.
pub const DIGIT_HEIGHT: u16 = 5;

const DIGITS: [[&str; 5]; 10] = [
    ["███", "█ █", "█ █", "█ █", "███"],
    ["██ ", " █ ", " █ ", " █ ", "███"],
    ["███", "  █", "███", "█  ", "███"],
    ["███", "  █", "███", "  █", "███"],
    ["█ █", "█ █", "███", "  █", "  █"],
    ["███", "█  ", "███", "  █", "███"],
    ["███", "█  ", "███", "█ █", "███"],
    ["███", "  █", "  █", "  █", "  █"],
    ["███", "█ █", "███", "█ █", "███"],
    ["███", "█ █", "███", "  █", "███"],
];

const SEPARATOR: [&str; 5] = ["    ", "    ", " ██ ", "    ", "    "];

/// Current-set score in block digits: `left - right`, centered.
///
/// Falls back to a single `left - right` line when the area is too short.
pub struct BigScore {
    pub left: u32,
    pub right: u32,
    pub left_style: Style,
    pub right_style: Style,
}

impl Widget for BigScore {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let left = glyph_rows(self.left);
        let right = glyph_rows(self.right);
        let total = row_width(&left) + 2 + SEPARATOR[0].len() as u16 + 2 + row_width(&right);

        if area.height < DIGIT_HEIGHT || area.width < total {
            let text = format!("{} - {}", self.left, self.right);
            let x = area.x + area.width.saturating_sub(text.len() as u16) / 2;
            let y = area.y + area.height / 2;
            buf.set_string(x, y, text, self.left_style);
            return;
        }

        let x = area.x + (area.width - total) / 2;
        let y = area.y + (area.height - DIGIT_HEIGHT) / 2;
        let sep_x = x + row_width(&left) + 2;
        let right_x = sep_x + SEPARATOR[0].len() as u16 + 2;

        for row in 0..DIGIT_HEIGHT as usize {
            let line_y = y + row as u16;
            buf.set_string(x, line_y, &left[row], self.left_style);
            buf.set_string(sep_x, line_y, SEPARATOR[row], Style::default());
            buf.set_string(right_x, line_y, &right[row], self.right_style);
        }
    }
}

fn glyph_rows(value: u32) -> [String; 5] {
    let digits: Vec<usize> = value
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as usize)
        .collect();
    std::array::from_fn(|row| {
        digits
            .iter()
            .map(|d| DIGITS[*d][row])
            .collect::<Vec<_>>()
            .join(" ")
    })
}

fn row_width(rows: &[String; 5]) -> u16 {
    rows[0].chars().count() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_digit_scores_render_side_by_side() {
        let rows = glyph_rows(21);
        assert_eq!(rows[0], "███ ██ ");
        assert_eq!(rows[4], "███ ███");
        assert_eq!(row_width(&rows), 7);
    }

    #[test]
    fn narrow_area_falls_back_to_text() {
        let area = Rect::new(0, 0, 12, 1);
        let mut buf = Buffer::empty(area);
        BigScore { left: 20, right: 19, left_style: Style::default(), right_style: Style::default() }
            .render(area, &mut buf);
        let line: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert_eq!(line.trim(), "20 - 19");
    }
}
