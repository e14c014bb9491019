//! Voice memo -> structured treatment candidate.
//!
//! - `transcription`: speech-to-text adapter contract and its OpenAI implementation
//! - `extraction`: transcript -> candidate adapter contract and its OpenAI implementation
//! - `candidate`: the candidate shape and validation of raw extraction output
//! - `products`: brand/code separation for spoken product names
//! - `pipeline`: runs transcription then extraction around a scoped temp file

mod candidate;
mod extraction;
mod openai;
mod pipeline;
mod products;
mod transcription;

pub use candidate::ExtractionCandidate;
pub use extraction::{treatment_schema, Extractor, OpenAiExtractor};
pub use openai::OpenAiClient;
pub use pipeline::{AudioUpload, ExtractionPipeline, ScopedAudio};
pub use products::split_brand_code;
pub use transcription::{OpenAiTranscriber, Transcriber};
