use docrag_core::traits::TextGenerator;
use docrag_core::types::RetrievalResult;
use docrag_core::Result;

use crate::prompt::{build_context, build_prompt};

/// Grounds a question in retrieved excerpts and asks the generator once.
pub struct AnswerSynthesizer<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> AnswerSynthesizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    pub fn synthesize(&self, question: &str, results: &[RetrievalResult]) -> Result<String> {
        let prompt = build_prompt(question, &build_context(results));
        self.generator.complete(&prompt)
    }
}
