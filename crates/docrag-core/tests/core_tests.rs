use docrag_core::chunker::{chunk_pages, chunk_spans, chunk_text};
use docrag_core::config::ChunkingSettings;
use docrag_core::types::PageText;
use proptest::prelude::*;

#[test]
fn overlap_not_below_size_is_rejected() {
    for (size, overlap) in [(100, 100), (100, 150), (0, 0)] {
        let settings = ChunkingSettings { size, overlap };
        let err = chunk_text("some text", &settings).expect_err("invalid settings");
        assert!(matches!(err, docrag_core::Error::ConfigInvalid(_)), "{err}");
    }
}

#[test]
fn empty_and_blank_text_produce_no_chunks() {
    let settings = ChunkingSettings::default();
    assert!(chunk_text("", &settings).expect("chunk").is_empty());
    assert!(chunk_text(" \n\t ", &settings).expect("chunk").is_empty());
}

#[test]
fn two_page_document_yields_three_windows() {
    let page_one: String = "Alpha beta gamma ".repeat(40).chars().take(600).collect();
    let page_two: String = "Delta epsilon zeta ".repeat(20).chars().take(300).collect();
    assert_eq!(page_one.chars().count(), 600);
    let pages = vec![PageText { page: 1, text: page_one }, PageText { page: 2, text: page_two }];

    let chunks = chunk_pages(&pages, &ChunkingSettings::default()).expect("chunk");
    let pages_seen: Vec<u32> = chunks.iter().map(|c| c.page).collect();
    assert_eq!(pages_seen, vec![1, 1, 2]);
    assert!(chunks.iter().all(|c| !c.text.is_empty()));
}

proptest! {
    #[test]
    fn windows_cover_text_without_gaps(text in "\\PC{0,1500}", size in 1usize..300, frac in 0.0f64..1.0) {
        let overlap = (size as f64 * frac) as usize;
        let settings = ChunkingSettings { size, overlap };
        let spans = chunk_spans(&text, &settings).expect("valid settings");
        let len = text.trim().chars().count();

        let mut covered = 0usize;
        for span in &spans {
            prop_assert!(span.start <= covered, "gap before {:?}", span);
            prop_assert!(span.end - span.start <= size);
            covered = covered.max(span.end);
        }
        prop_assert_eq!(covered, len);
    }

    #[test]
    fn short_text_is_a_single_chunk(text in "[a-z ]{1,50}") {
        prop_assume!(!text.trim().is_empty());
        let chunks = chunk_text(&text, &ChunkingSettings::default()).expect("chunk");
        prop_assert_eq!(chunks, vec![text.trim().to_string()]);
    }

    #[test]
    fn chunks_are_trimmed_substrings(text in "[a-z \n]{0,800}", size in 2usize..120) {
        let settings = ChunkingSettings { size, overlap: size / 2 };
        let trimmed = text.trim();
        for chunk in chunk_text(&text, &settings).expect("chunk") {
            prop_assert!(!chunk.is_empty());
            prop_assert_eq!(chunk.trim(), chunk.as_str());
            prop_assert!(trimmed.contains(&chunk));
        }
    }
}
