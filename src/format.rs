//! Result formatting: flat text for copy/export, display fragments for the
//! terminal panel. Both are pure functions of `(result, mode)`.

use crate::model::{CompactionMode, CompactionResult, Flashcard, ResultShape};
use console::style;

pub const PLACEHOLDER: &str = "Nothing to show yet.";

/// Structured content for on-screen rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayFragment {
    Paragraph(String),
    List(Vec<String>),
    Cards(Vec<CardBlock>),
    Placeholder(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBlock {
    /// 1-based position.
    pub number: usize,
    pub question: String,
    pub answer: String,
}

/// Returns the result's content only when it has the shape `mode` expects.
fn matching<'a>(result: &'a CompactionResult, mode: CompactionMode) -> Option<&'a CompactionResult> {
    (result.shape() == mode.shape()).then_some(result)
}

pub fn to_plain_text(result: &CompactionResult, mode: CompactionMode) -> String {
    match matching(result, mode) {
        Some(CompactionResult::Text { text }) => text.clone(),
        Some(CompactionResult::Bullets { items }) => items.join("\n"),
        Some(CompactionResult::Cards { cards }) => cards
            .iter()
            .enumerate()
            .map(|(i, card)| card_text(i + 1, card))
            .collect::<Vec<_>>()
            .join("\n\n"),
        None => String::new(),
    }
}

fn card_text(number: usize, card: &Flashcard) -> String {
    format!(
        "Card {}\nQuestion: {}\nAnswer: {}",
        number, card.question, card.answer
    )
}

pub fn to_display_fragment(result: &CompactionResult, mode: CompactionMode) -> DisplayFragment {
    let Some(result) = matching(result, mode) else {
        return DisplayFragment::Placeholder(PLACEHOLDER);
    };
    if result.is_empty() {
        return DisplayFragment::Placeholder(PLACEHOLDER);
    }
    match (mode.shape(), result) {
        (ResultShape::Text, CompactionResult::Text { text }) => {
            DisplayFragment::Paragraph(text.clone())
        }
        (ResultShape::List, CompactionResult::Bullets { items }) => {
            DisplayFragment::List(items.clone())
        }
        (ResultShape::Cards, CompactionResult::Cards { cards }) => DisplayFragment::Cards(
            cards
                .iter()
                .enumerate()
                .map(|(i, c)| CardBlock {
                    number: i + 1,
                    question: c.question.clone(),
                    answer: c.answer.clone(),
                })
                .collect(),
        ),
        _ => DisplayFragment::Placeholder(PLACEHOLDER),
    }
}

impl DisplayFragment {
    /// Lay the fragment out as plain lines wrapped to `width` columns. Used
    /// for both the terminal view and the image snapshot.
    pub fn lines(&self, width: usize) -> Vec<String> {
        let width = width.max(20);
        let wrap = |s: &str, initial: &str, subsequent: &str| -> Vec<String> {
            let opts = textwrap::Options::new(width)
                .initial_indent(initial)
                .subsequent_indent(subsequent);
            textwrap::wrap(s, opts)
                .into_iter()
                .map(|l| l.into_owned())
                .collect()
        };

        match self {
            DisplayFragment::Paragraph(text) => text
                .lines()
                .flat_map(|line| {
                    if line.trim().is_empty() {
                        vec![String::new()]
                    } else {
                        wrap(line, "", "")
                    }
                })
                .collect(),
            DisplayFragment::List(items) => items
                .iter()
                .flat_map(|item| wrap(item, "• ", "  "))
                .collect(),
            DisplayFragment::Cards(cards) => {
                let mut out = Vec::new();
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        out.push(String::new());
                    }
                    out.push(format!("Card {}", card.number));
                    out.extend(wrap(&card.question, "Q: ", "   "));
                    out.extend(wrap(&card.answer, "A: ", "   "));
                }
                out
            }
            DisplayFragment::Placeholder(text) => vec![(*text).to_string()],
        }
    }

    /// Styled rendering for an interactive terminal.
    pub fn render(&self, width: usize) -> String {
        match self {
            DisplayFragment::Placeholder(text) => style(text).dim().italic().to_string(),
            DisplayFragment::Cards(_) => self
                .lines(width)
                .into_iter()
                .map(|line| {
                    if line.starts_with("Card ") {
                        style(line).bold().cyan().to_string()
                    } else if line.starts_with("Q: ") {
                        style(line).bold().to_string()
                    } else {
                        line
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
            _ => self.lines(width).join("\n"),
        }
    }
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
