//! Large block rendering for revealed symbols.

/// 3x5 bitmaps for the decimal digits. `#` is a lit cell.
const DIGITS: [[&str; 5]; 10] = [
    ["###", "# #", "# #", "# #", "###"],
    ["  #", "  #", "  #", "  #", "  #"],
    ["###", "  #", "###", "#  ", "###"],
    ["###", "  #", "###", "  #", "###"],
    ["# #", "# #", "###", "  #", "  #"],
    ["###", "#  ", "###", "  #", "###"],
    ["###", "#  ", "###", "# #", "###"],
    ["###", "  #", "  #", "  #", "  #"],
    ["###", "# #", "###", "# #", "###"],
    ["###", "# #", "###", "  #", "###"],
];

pub const BIG_HEIGHT: u16 = 5;

/// Lines for a large rendering of `symbol`, or `None` if there is no bitmap.
/// Each lit cell is drawn two columns wide so the glyph looks square.
#[must_use]
pub fn big_symbol(symbol: char, pixel: &str) -> Option<Vec<String>> {
    let digit = symbol.to_digit(10)?;
    let rows = DIGITS[digit as usize];
    Some(
        rows.iter()
            .map(|row| {
                row.chars()
                    .map(|cell| {
                        if cell == '#' {
                            pixel.repeat(2)
                        } else {
                            "  ".to_string()
                        }
                    })
                    .collect()
            })
            .collect(),
    )
}
