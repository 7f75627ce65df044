//! Property tests for the chunk size and overlap contract.

use nepisirsem_rag::chunking::{Chunker, FixedSizeChunker, RecursiveChunker, TextSpan};
use proptest::prelude::*;

/// Text drawn from Turkish letters, digits, punctuation and the separators
/// the recursive chunker looks for.
fn arb_recipe_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            8 => "[a-zçğıöşüA-ZÇĞİÖŞÜ]{1,9}",
            3 => Just(" ".to_string()),
            1 => Just(". ".to_string()),
            1 => Just("\n".to_string()),
            1 => Just("\n\n".to_string()),
            1 => "[0-9]{1,3}",
        ],
        0..120,
    )
    .prop_map(|parts| parts.concat())
}

/// Chunk size and an overlap strictly below it.
fn arb_sizes() -> impl Strategy<Value = (usize, usize)> {
    (2usize..60).prop_flat_map(|size| (Just(size), 0..size))
}

fn check_contract(text: &str, spans: &[TextSpan], size: usize, overlap: usize) -> Result<(), TestCaseError> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        prop_assert!(spans.is_empty());
        return Ok(());
    }

    prop_assert_eq!(spans[0].start, 0);
    prop_assert_eq!(spans.last().unwrap().end, chars.len());

    let mut rebuilt: String = spans[0].text.clone();
    for span in spans {
        let len = span.text.chars().count();
        prop_assert!(len <= size, "chunk of {} chars exceeds {}", len, size);
        prop_assert!(len > 0);
        prop_assert_eq!(span.end - span.start, len);
        let expected: String = chars[span.start..span.end].iter().collect();
        prop_assert_eq!(&span.text, &expected);
    }
    for pair in spans.windows(2) {
        prop_assert_eq!(pair[1].start, pair[0].end - overlap, "overlap must be exact");
        prop_assert!(pair[1].end > pair[0].end, "chunks must make progress");
        rebuilt.extend(pair[1].text.chars().skip(overlap));
    }
    prop_assert_eq!(rebuilt, text);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn fixed_size_honours_contract(text in arb_recipe_text(), (size, overlap) in arb_sizes()) {
        let spans = FixedSizeChunker::new(size, overlap).split(&text);
        check_contract(&text, &spans, size, overlap)?;
    }

    #[test]
    fn recursive_honours_contract(text in arb_recipe_text(), (size, overlap) in arb_sizes()) {
        let spans = RecursiveChunker::new(size, overlap).split(&text);
        check_contract(&text, &spans, size, overlap)?;
    }

    #[test]
    fn chunking_is_deterministic(text in arb_recipe_text(), (size, overlap) in arb_sizes()) {
        let chunker = RecursiveChunker::new(size, overlap);
        prop_assert_eq!(chunker.split(&text), chunker.split(&text));
    }
}

#[test]
fn recipe_stays_in_one_chunk_when_it_fits() {
    let menemen = "Menemen\nHazırlık: 10 dk\nMalzemeler: 3 yumurta, 2 domates, 1 biber";
    let kisir = "Kısır\nHazırlık: 20 dk\nMalzemeler: bulgur, salça, maydanoz";
    let text = format!("{menemen}\n\n{kisir}");

    let spans = RecursiveChunker::new(80, 0).split(&text);
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].text.trim_end(), menemen);
    assert_eq!(spans[1].text, kisir);
}
