//! Page layout: wrapping, line placement, and pagination on A4.
//!
//! Widths are approximated by character count using Helvetica's average
//! advance; this keeps layout independent of font metrics tables.

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.0;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 842.0;
/// One inch on every side.
pub const MARGIN: f32 = 72.0;

pub const TITLE_SIZE: f32 = 18.0;
const TITLE_LEADING: f32 = 22.0;
const TITLE_WRAP_CHARS: usize = 45;

pub const BODY_SIZE: f32 = 11.0;
const BODY_LEADING: f32 = 14.0;
const BODY_WRAP_CHARS: usize = 82;

/// Gap between title and body (0.2 in).
const TITLE_SPACER: f32 = 14.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Title,
    Body,
}

impl FontRole {
    pub fn size(&self) -> f32 {
        match self {
            Self::Title => TITLE_SIZE,
            Self::Body => BODY_SIZE,
        }
    }

    fn leading(&self) -> f32 {
        match self {
            Self::Title => TITLE_LEADING,
            Self::Body => BODY_LEADING,
        }
    }
}

/// A line of text positioned on a page (baseline coordinates).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub role: FontRole,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// Lay out a title followed by a body. Every `\n` in `body` starts a new
/// line; blank lines are kept.
pub fn layout(title: &str, body: &str) -> Vec<PageLayout> {
    let mut pages = Composer::new();

    for line in wrap(title, TITLE_WRAP_CHARS) {
        pages.place(FontRole::Title, line);
    }
    pages.skip(TITLE_SPACER);

    for paragraph in body.lines() {
        for line in wrap(paragraph, BODY_WRAP_CHARS) {
            pages.place(FontRole::Body, line);
        }
    }

    pages.finish()
}

/// Greedy word wrap to at most `max_chars` characters per line.
/// Words longer than a line are split.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Places lines top-down and opens a new page when the bottom margin is hit.
struct Composer {
    done: Vec<PageLayout>,
    page: PageLayout,
    cursor: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            page: PageLayout::default(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn place(&mut self, role: FontRole, text: String) {
        if self.cursor - role.leading() < MARGIN {
            self.done.push(std::mem::take(&mut self.page));
            self.cursor = PAGE_HEIGHT - MARGIN;
        }
        self.cursor -= role.leading();
        self.page.lines.push(PlacedLine {
            role,
            x: MARGIN,
            y: self.cursor,
            text,
        });
    }

    fn skip(&mut self, gap: f32) {
        self.cursor -= gap;
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.done.push(self.page);
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(page: &PageLayout, role: FontRole) -> Vec<&str> {
        page.lines
            .iter()
            .filter(|l| l.role == role)
            .map(|l| l.text.as_str())
            .collect()
    }

    #[test]
    fn wrap_keeps_short_text() {
        assert_eq!(wrap("hello world", 20), vec!["hello world"]);
        assert_eq!(wrap("", 20), vec![""]);
    }

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn wrap_splits_overlong_words() {
        assert_eq!(wrap("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
        assert_eq!(wrap("añoñoño", 3), vec!["año", "ñoñ", "o"]);
    }

    #[test]
    fn body_newlines_become_lines() {
        let pages = layout("Title", "first\n\nthird");
        assert_eq!(pages.len(), 1);
        assert_eq!(texts(&pages[0], FontRole::Title), vec!["Title"]);
        assert_eq!(texts(&pages[0], FontRole::Body), vec!["first", "", "third"]);
    }

    #[test]
    fn lines_descend_within_margins() {
        let pages = layout("Title", "a\nb\nc");
        let ys: Vec<f32> = pages[0].lines.iter().map(|l| l.y).collect();
        assert!(ys.windows(2).all(|w| w[0] > w[1]));
        assert!(ys.iter().all(|y| *y >= MARGIN && *y <= PAGE_HEIGHT - MARGIN));
    }

    #[test]
    fn long_body_paginates() {
        let body = vec!["line"; 120].join("\n");
        let pages = layout("Title", &body);
        assert!(pages.len() >= 3, "got {} pages", pages.len());

        let body_lines: usize = pages.iter().map(|p| texts(p, FontRole::Body).len()).sum();
        assert_eq!(body_lines, 120);
        assert!(texts(&pages[1], FontRole::Title).is_empty());
    }
}
