//! Question answering over ingested documents: ingestion orchestration,
//! prompt assembly and the generation client.

pub mod generate;
pub mod pipeline;
pub mod prompt;
pub mod synth;

pub use generate::ChatCompletionsClient;
pub use pipeline::DocQa;
pub use synth::AnswerSynthesizer;
