//! Plain-text maze drawing for the terminal.

use micromouse::prelude::*;

/// Smallest box holding every cell with two or more known walls. Cells
/// outside the real maze never get more than one, so on a mapped memory grid
/// this is the maze itself.
pub fn known_bounds(board: &Grid) -> Option<(Coords, Coords)> {
    let mut bounds: Option<(Coords, Coords)> = None;
    for cell in board.cells().filter(|c| c.wall_count() >= 2) {
        let (lo, hi) = bounds.get_or_insert((cell.coords(), cell.coords()));
        lo.x = lo.x.min(cell.x);
        lo.y = lo.y.min(cell.y);
        hi.x = hi.x.max(cell.x);
        hi.y = hi.y.max(cell.y);
    }
    bounds
}

fn glyph(direction: AbsoluteDirection) -> char {
    match direction {
        AbsoluteDirection::North => '^',
        AbsoluteDirection::East => '>',
        AbsoluteDirection::South => 'v',
        AbsoluteDirection::West => '<',
    }
}

fn content(view: &dyn MazePerspective, cell: &Cell, label: Option<CellText>) -> String {
    let at = cell.coords();
    if at == view.mouse_location() {
        return format!(" {} ", glyph(view.mouse_direction()));
    }
    if view.win_location() == Some(at) {
        return " G ".to_string();
    }
    let text = label.map(|l| view.text(cell, l)).unwrap_or_default();
    let text: String = text.chars().take(3).collect();
    format!("{text:^3}")
}

pub fn render(view: &dyn MazePerspective, label: Option<CellText>) -> String {
    let board = view.board();
    let Some((lo, hi)) = known_bounds(board) else {
        return String::new();
    };

    let mut out = String::new();
    for y in lo.y..=hi.y {
        let mut top = String::new();
        let mut mid = String::new();
        for x in lo.x..=hi.x {
            let at = Coords::new(x, y);
            let Some(cell) = board.cell(at) else {
                continue;
            };
            top.push('+');
            top.push_str(if cell.has_wall(AbsoluteDirection::North) {
                "---"
            } else {
                "   "
            });
            mid.push(if cell.has_wall(AbsoluteDirection::West) {
                '|'
            } else {
                ' '
            });
            mid.push_str(&content(view, cell, label));
        }
        top.push('+');
        mid.push(if board.has_wall(Coords::new(hi.x, y), AbsoluteDirection::East) {
            '|'
        } else {
            ' '
        });
        out.push_str(&top);
        out.push('\n');
        out.push_str(&mid);
        out.push('\n');
    }
    for x in lo.x..=hi.x {
        out.push('+');
        out.push_str(if board.has_wall(Coords::new(x, hi.y), AbsoluteDirection::South) {
            "---"
        } else {
            "   "
        });
    }
    out.push_str("+\n");
    out
}
