//! The result panel: a titled block around a rendered display fragment.

use crate::format::DisplayFragment;
use console::{Term, style};

const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 100;

/// Wrap width for the panel body, derived from the terminal when there is one.
pub fn panel_width() -> usize {
    let term = Term::stdout();
    if !term.is_term() {
        return 80;
    }
    let (_, cols) = term.size();
    (cols as usize).saturating_sub(4).clamp(MIN_WIDTH, MAX_WIDTH)
}

/// Render `fragment` under `title`. `plain` drops all styling and the rule,
/// leaving output that can be piped.
pub fn render_panel(title: &str, fragment: &DisplayFragment, width: usize, plain: bool) -> String {
    if plain {
        return fragment.lines(width).join("\n");
    }
    let rule = "─".repeat(width.min(title.chars().count() + 4).max(MIN_WIDTH));
    format!(
        "{}\n{}\n{}\n{}",
        style(title).bold().magenta(),
        style(&rule).dim(),
        fragment.render(width),
        style(&rule).dim()
    )
}
