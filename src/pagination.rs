//! Paging of choice lists and rendering of replies within the USSD budget.
//!
//! Page boundaries depend on the page size only. The character budget is
//! enforced afterwards by [`render_page`], which shortens option labels.

use crate::value::Scalar;

/// Options shown per page, not counting navigation entries.
pub const OPTIONS_PER_PAGE: usize = 5;

/// Hard limit on a single reply.
pub const CHARACTERS_PER_PAGE: usize = 163;

const ELLIPSIS: &str = "...";
const MIN_LABEL_CHARS: usize = 4;

/// A selectable option. `value == None` marks sentinels such as
/// "None of the above".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: Option<Scalar>,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<Scalar>, label: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            label: label.into(),
        }
    }

    pub fn sentinel(label: impl Into<String>) -> Self {
        Self {
            value: None,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageItem {
    Choice(ChoiceOption),
    More(String),
    Back(String),
}

impl PageItem {
    pub fn label(&self) -> &str {
        match self {
            PageItem::Choice(option) => &option.label,
            PageItem::More(label) | PageItem::Back(label) => label,
        }
    }
}

/// What a 1-based reply on a rendered page refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(ChoiceOption),
    More,
    Back,
    Invalid,
}

/// One rendered page: visible options followed by navigation entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub items: Vec<PageItem>,
}

impl Page {
    pub fn select(&self, input: &str) -> Selection {
        let Ok(index) = input.trim().parse::<usize>() else {
            return Selection::Invalid;
        };
        match index.checked_sub(1).and_then(|i| self.items.get(i)) {
            Some(PageItem::Choice(option)) => Selection::Chosen(option.clone()),
            Some(PageItem::More(_)) => Selection::More,
            Some(PageItem::Back(_)) => Selection::Back,
            None => Selection::Invalid,
        }
    }

    pub fn has_more(&self) -> bool {
        self.items.iter().any(|i| matches!(i, PageItem::More(_)))
    }

    pub fn has_back(&self) -> bool {
        self.items.iter().any(|i| matches!(i, PageItem::Back(_)))
    }
}

#[derive(Debug, Clone)]
pub struct Paginator {
    pub page_size: usize,
    pub more_label: String,
    pub back_label: String,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page_size: OPTIONS_PER_PAGE,
            more_label: "View more".into(),
            back_label: "Back".into(),
        }
    }
}

impl Paginator {
    /// Build the page starting at `cursor`. A cursor past the end is pulled
    /// back to the last page.
    pub fn page(&self, options: &[ChoiceOption], cursor: usize) -> Page {
        let size = self.page_size.max(1);
        let last_start = options.len().saturating_sub(1) / size * size;
        let offset = cursor.min(last_start);
        let end = (offset + size).min(options.len());

        let mut items: Vec<PageItem> = options[offset..end]
            .iter()
            .cloned()
            .map(PageItem::Choice)
            .collect();
        if end < options.len() {
            items.push(PageItem::More(self.more_label.clone()));
        }
        if offset > 0 {
            items.push(PageItem::Back(self.back_label.clone()));
        }
        Page { offset, items }
    }

    pub fn advance(&self, cursor: usize) -> usize {
        cursor + self.page_size.max(1)
    }

    pub fn retreat(&self, cursor: usize) -> usize {
        cursor.saturating_sub(self.page_size.max(1))
    }
}

/// Render `header` and the numbered page items within `budget` characters.
/// The longest option labels are shortened first; navigation labels are
/// never touched.
pub fn render_page(header: &str, page: &Page, budget: usize) -> String {
    let mut labels: Vec<(String, bool)> = page
        .items
        .iter()
        .map(|item| (item.label().to_string(), matches!(item, PageItem::Choice(_))))
        .collect();

    loop {
        let text = compose(header, &labels);
        let len = text.chars().count();
        if len <= budget {
            return text;
        }
        let excess = len - budget;

        let longest = labels
            .iter()
            .enumerate()
            .filter(|(_, (_, shrinkable))| *shrinkable)
            .map(|(i, (label, _))| (i, label.chars().count()))
            .max_by_key(|&(_, n)| n);
        let Some((index, chars)) = longest else {
            return truncate(&text, budget);
        };
        if chars <= MIN_LABEL_CHARS + ELLIPSIS.len() {
            return truncate(&text, budget);
        }
        let keep = chars
            .saturating_sub(excess + ELLIPSIS.len())
            .max(MIN_LABEL_CHARS);
        let shortened: String = labels[index].0.chars().take(keep).collect();
        labels[index].0 = shortened + ELLIPSIS;
    }
}

/// Render plain text (free-text prompts, terminal messages) within `budget`.
pub fn render_text(text: &str, budget: usize) -> String {
    truncate(text, budget)
}

fn compose(header: &str, labels: &[(String, bool)]) -> String {
    let mut text = header.to_string();
    for (i, (label, _)) in labels.iter().enumerate() {
        text.push('\n');
        text.push_str(&format!("{}. {label}", i + 1));
    }
    text
}

fn truncate(text: &str, budget: usize) -> String {
    text.chars().take(budget).collect()
}
