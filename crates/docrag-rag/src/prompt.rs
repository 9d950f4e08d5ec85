use docrag_core::types::RetrievalResult;

/// One line per excerpt, in the order given:
/// `[page P | score S] text` with newlines inside the text flattened.
pub fn build_context(results: &[RetrievalResult]) -> String {
    let mut context = String::new();
    for r in results {
        context.push_str(&format!("[page {} | score {:.3}] {}\n", r.page, r.score, r.text.replace('\n', " ")));
    }
    context
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "Use ONLY the provided document excerpts.\n\
         If the answer cannot be found, say you don't see it.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer clearly and cite page numbers."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(page: u32, text: &str, score: f32) -> RetrievalResult {
        RetrievalResult { page, text: text.into(), score }
    }

    #[test]
    fn context_lines_keep_order_and_round_scores() {
        let context = build_context(&[result(2, "line one\nline two", 0.91234), result(1, "other", 0.5)]);
        assert_eq!(context, "[page 2 | score 0.912] line one line two\n[page 1 | score 0.500] other\n");
    }

    #[test]
    fn empty_results_give_empty_context() {
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn prompt_wraps_context_and_question() {
        let prompt = build_prompt("What is X?", "[page 1 | score 1.000] X is Y\n");
        let expected = "Use ONLY the provided document excerpts.\n\
                        If the answer cannot be found, say you don't see it.\n\n\
                        Context:\n[page 1 | score 1.000] X is Y\n\n\n\
                        Question: What is X?\n\n\
                        Answer clearly and cite page numbers.";
        assert_eq!(prompt, expected);
    }
}
