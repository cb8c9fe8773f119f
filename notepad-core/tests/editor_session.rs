//! Editor session integration tests.
//!
//! Drives `AppState` the way the toolbar panels do and checks that the live
//! view and style stay in step.

use notepad_core::palette::{BACKGROUND_COLORS, FONT_SIZES, STICKERS, TEXT_COLORS};
use notepad_core::{
    AppState, Color, Extent, FontStyle, FontWeight, NodeKind, StyleAttributes, TextAlign,
    TextDecoration, Tool,
};

/// Text of the footer node in the live view.
fn footer(state: &AppState) -> String {
    state.view().with_document(|doc| {
        doc.children(state.view().region())
            .find_map(|n| match &n.kind {
                NodeKind::Footer { text } => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default()
    })
}

#[test]
fn test_full_styling_session() {
    let mut state = AppState::new();
    state.select_tool(Tool::Background);
    state.change_background(BACKGROUND_COLORS[3]);

    state.select_tool(Tool::Text);
    state.apply_style(&StyleAttributes::color(TEXT_COLORS[1]));
    state.apply_style(&StyleAttributes::font_size(f32::from(FONT_SIZES[7])));
    state.align(TextAlign::Right);

    state.select_tool(Tool::Effects);
    state.toggle_bold();
    state.toggle_italic();
    state.toggle_underline();

    state.set_content("Weekend plans");
    state.insert_sticker(STICKERS[5]);

    let style = state.style();
    assert_eq!(style.resolved_background(), BACKGROUND_COLORS[3]);
    assert_eq!(style.resolved_color(), TEXT_COLORS[1]);
    assert!((style.resolved_font_size() - 32.0).abs() < f32::EPSILON);
    assert_eq!(style.resolved_text_align(), TextAlign::Right);
    assert_eq!(style.resolved_font_weight(), FontWeight::Bold);
    assert_eq!(style.resolved_font_style(), FontStyle::Italic);
    assert_eq!(style.resolved_text_decoration(), TextDecoration::Underline);
    assert_eq!(state.active_tool, Some(Tool::Effects));

    let count = "Weekend plans🎉".chars().count();
    assert_eq!(footer(&state), format!("{count} characters · Align: right"));
}

#[test]
fn test_toggles_flip_back() {
    let mut state = AppState::new();
    state.toggle_bold();
    state.toggle_bold();
    state.toggle_underline();
    state.toggle_underline();

    assert_eq!(state.style().resolved_font_weight(), FontWeight::Normal);
    assert_eq!(
        state.style().resolved_text_decoration(),
        TextDecoration::None
    );
}

#[test]
fn test_merge_keeps_unrelated_fields() {
    let mut state = AppState::new();
    state.change_background(Color::rgb(0x21, 0x25, 0x29));
    state.apply_style(&StyleAttributes::color(Color::WHITE));

    assert_eq!(state.style().resolved_background(), Color::rgb(0x21, 0x25, 0x29));
    assert_eq!(state.style().resolved_color(), Color::WHITE);
}

#[test]
fn test_view_clips_long_notes_but_clones_do_not_keep_style() {
    let mut state = AppState::new();
    state.set_content("line\n".repeat(100));
    state.change_background(Color::rgb(0xf5, 0x65, 0x65));

    let region = state.view().region();
    state.view().with_document(|doc| {
        let live = doc.get(region).expect("region");
        assert!(matches!(live.layout.height, Extent::Fixed(_)));
        assert!(live.style.is_some());

        let clone = doc.clone_subtree(region).expect("clone");
        assert!(clone.nodes.iter().all(|n| n.style.is_none()));
        assert_eq!(clone.nodes.len(), 3);
    });
}

#[test]
fn test_style_json_uses_camel_case() {
    let mut state = AppState::new();
    state.change_background(Color::rgb(0x66, 0x7e, 0xea));
    let json = state.style().to_json().expect("json");
    assert!(json.contains("\"backgroundColor\":\"#667eea\""), "{json}");

    let parsed = StyleAttributes::from_json(&json).expect("parse");
    assert_eq!(&parsed, state.style());
}
