pub const GLYPH_WIDTH: usize = 3;
pub const GLYPH_HEIGHT: usize = 5;
pub const GLYPH_SPACING: usize = 1;
pub const LINE_SPACING: usize = 2;

pub fn overlay_text(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    text: &str,
    color: [u8; 3],
) {
    let mut cursor_x = x;
    for ch in text.chars() {
        draw_glyph(pixels, width, height, cursor_x, y, ch, color);
        cursor_x = cursor_x.saturating_add(GLYPH_WIDTH + GLYPH_SPACING);
        if cursor_x >= width {
            break;
        }
    }
}

fn draw_glyph(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    ch: char,
    color: [u8; 3],
) {
    let rows = glyph_rows(ch);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            let tx = x + col;
            let ty = y + row;
            if tx >= width || ty >= height {
                continue;
            }
            let offset = (ty * width + tx) * 4;
            if let Some(cell) = pixels.get_mut(offset..offset + 4) {
                for (channel, value) in cell[..3].iter_mut().zip(color) {
                    *channel = (*channel).max(value);
                }
                cell[3] = 255;
            }
        }
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_HEIGHT] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b000, 0b000, 0b000],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixels: &[u8], width: usize, px: usize, py: usize) -> [u8; 4] {
        let offset = (py * width + px) * 4;
        [
            pixels[offset],
            pixels[offset + 1],
            pixels[offset + 2],
            pixels[offset + 3],
        ]
    }

    #[test]
    fn overlay_text_sets_expected_pixels() {
        let width = 8;
        let height = 8;
        let mut pixels = vec![0u8; width * height * 4];
        pixels[(1 + width) * 4] = 250;
        overlay_text(&mut pixels, width, height, 1, 1, "0", [200, 10, 0]);
        assert_eq!(pixel(&pixels, width, 1, 1), [250, 10, 0, 255]);
        assert_eq!(pixel(&pixels, width, 3, 1), [200, 10, 0, 255]);
        assert_eq!(pixel(&pixels, width, 2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn glyphs_advance_by_width_and_spacing() {
        let width = 12;
        let height = 8;
        let mut pixels = vec![0u8; width * height * 4];
        overlay_text(&mut pixels, width, height, 1, 1, "II", [255, 255, 255]);
        assert_eq!(pixel(&pixels, width, 5, 1), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixels, width, 4, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn glyphs_clip_at_buffer_edges() {
        let width = 8;
        let height = 8;
        let mut pixels = vec![0u8; width * height * 4];
        overlay_text(&mut pixels, width, height, 6, 6, "8", [255, 255, 255]);
        assert_eq!(pixel(&pixels, width, 6, 6), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixels, width, 7, 7), [0, 0, 0, 0]);
    }
}
