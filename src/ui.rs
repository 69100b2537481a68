use crate::config::{CounterLookup, LabelStyle};
use crate::models::{CounterKey, LikeableElement, ResourceId, ToggleMode};
use crate::state::Board;
use serde::Serialize;
use std::fmt::Write;

pub const GLYPH_LIKE: &str = "\u{2661}";
pub const GLYPH_UNLIKE: &str = "\u{2665}";

pub fn label_for(mode: ToggleMode, style: LabelStyle) -> &'static str {
    match (style, mode) {
        (LabelStyle::Word, mode) => mode.as_str(),
        (LabelStyle::Glyph, ToggleMode::Like) => GLYPH_LIKE,
        (LabelStyle::Glyph, ToggleMode::Unlike) => GLYPH_UNLIKE,
    }
}

/// What the page shows for one likeable element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementView {
    pub id: ResourceId,
    pub action: ToggleMode,
    pub label: String,
    pub count: Option<String>,
}

pub fn element_view(
    board: &Board,
    element: &LikeableElement,
    style: LabelStyle,
    lookup: CounterLookup,
) -> ElementView {
    ElementView {
        id: element.id.clone(),
        action: element.action,
        label: label_for(element.action, style).to_string(),
        count: board
            .counter_for(&element.id, lookup)
            .map(|counter| counter.text().to_string()),
    }
}

pub fn render_page(board: &Board, style: LabelStyle, lookup: CounterLookup) -> String {
    let mut html = String::new();
    for element in board.elements() {
        let view = element_view(board, element, style, lookup);
        let _ = write!(
            html,
            r##"<a class="like" href="#" data-id="{id}" data-action="{action}">{label}</a>"##,
            id = escape(view.id.as_str()),
            action = view.action,
            label = escape(&view.label),
        );
        if lookup == CounterLookup::ById {
            if let Some(count) = &view.count {
                let _ = write!(
                    html,
                    r#" <span id="{id}">{count}</span>"#,
                    id = escape(view.id.as_str()),
                    count = escape(count),
                );
            }
        }
        html.push('\n');
    }
    if lookup == CounterLookup::Shared {
        if let Some(total) = board.counter(&CounterKey::Shared) {
            let _ = writeln!(
                html,
                r#"<span class="count"><span class="total">{}</span></span>"#,
                escape(total.text())
            );
        }
    }
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
