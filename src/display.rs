//! Human-readable rendering of a `Board`.
//!
//! Face-down cards are shown as "XX" and face-up cards with their
//! `short_str()` code. Pile labels match the codes `PileId` parses
//! (`f1`, `t3`, `s`, `w`), so the rendering doubles as a key for the CLI.

use crate::board::Board;
use crate::card::Card;
use crate::pile::Pile;

/// Format a single card for display, either face-up or face-down.
pub fn format_card_visible(card: Card, face_up: bool) -> String {
    if face_up {
        card.short_str()
    } else {
        "XX".to_string()
    }
}

/// Render only the foundation row, showing the top card of each pile.
///
///   - Empty foundation: `[  ]`
///   - Non-empty: e.g. `[AH]`, `[7C]`, `[KD]`
pub fn render_foundations(board: &Board) -> String {
    let mut s = String::from("Foundations:");
    for f in board.foundations() {
        s.push_str(&format!(" {}", f.id()));
        match f.top_card() {
            Some(card) => s.push_str(&format!("[{}]", card.short_str())),
            None => s.push_str("[  ]"),
        }
    }
    s
}

/// Stock is shown as a count; waste shows its top card and size.
pub fn render_stock_and_waste(board: &Board) -> String {
    let stock = board.stock();
    let stock_part = if stock.is_empty() {
        "Stock s: [empty]".to_string()
    } else {
        format!("Stock s: [{} cards]", stock.len())
    };

    let waste = board.waste();
    let waste_part = match waste.top_card() {
        None => "Waste w: [empty]".to_string(),
        Some(top) => format!("Waste w: [{}] ({} cards)", top.short_str(), waste.len()),
    };

    format!("{stock_part}    {waste_part}")
}

/// Render all tableau columns as a multi-line string.
///
/// Columns are **top-justified**: each column starts at its bottom card on
/// the first row, and the last row a column reaches is its playable top.
pub fn render_columns(board: &Board) -> String {
    let mut s = String::from("      ");
    for pile in board.tableau() {
        s.push_str(&format!(" {:<3}", pile.id().to_string()));
    }
    s.push('\n');

    let max_height = board.tableau().iter().map(Pile::len).max().unwrap_or(0);
    for row in 0..max_height {
        s.push_str("      ");
        for pile in board.tableau() {
            match pile.cards().get(row) {
                Some(&card) => {
                    let rep = format_card_visible(card, board.face(card).is_up());
                    s.push_str(&format!("{rep:>3} "));
                }
                None => s.push_str("    "),
            }
        }
        s.push('\n');
    }
    s
}

/// Render a full board (foundations, stock/waste, and columns).
pub fn render_board(board: &Board) -> String {
    format!(
        "{}\n{}\n\n{}",
        render_foundations(board),
        render_stock_and_waste(board),
        render_columns(board)
    )
}

/// One line per pile listing every card bottom-to-top with face-down cards
/// in lower case. For debugging; reveals hidden cards.
pub fn render_full_piles_debug(board: &Board) -> String {
    let mut s = String::new();
    for pile in board.piles() {
        s.push_str(&format!("{:>2}:", pile.id().to_string()));
        for &card in pile.cards() {
            let code = card.short_str();
            if board.face(card).is_up() {
                s.push_str(&format!(" {code}"));
            } else {
                s.push_str(&format!(" {}", code.to_ascii_lowercase()));
            }
        }
        s.push('\n');
    }
    s
}
