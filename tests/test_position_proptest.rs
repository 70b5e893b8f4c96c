//! Offset/position conversion is lossless on character boundaries, for
//! any mix of line endings and UTF-16 widths.
#![cfg(feature = "proptest")]

use c3lsp::base::DocId;
use c3lsp::project::Document;
use proptest::prelude::*;

/// Text drawn from ASCII, two- and three-byte BMP characters,
/// supplementary code points and both line endings.
fn arb_text() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-z0-9 ;.(){}]{1,8}",
        Just("\n".to_string()),
        Just("\r\n".to_string()),
        Just("é".to_string()),
        Just("€".to_string()),
        Just("😀".to_string()),
        Just("𐍈".to_string()),
    ];
    prop::collection::vec(piece, 0..40).prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn offset_position_roundtrip(text in arb_text()) {
        let document = Document::new(DocId::from("file:///ws/prop.c3"), text.clone(), 1);
        for (offset, _) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            let position = document.position(offset);
            prop_assert_eq!(document.offset(position), offset);
        }
    }

    #[test]
    fn positions_are_monotonic(text in arb_text()) {
        let document = Document::new(DocId::from("file:///ws/prop.c3"), text.clone(), 1);
        let positions: Vec<_> = text.char_indices().map(|(offset, _)| document.position(offset)).collect();
        for pair in positions.windows(2) {
            prop_assert!((pair[0].line, pair[0].character) < (pair[1].line, pair[1].character));
        }
    }
}
