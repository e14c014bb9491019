// Shared fixtures for integration tests: scripted voice adapters and a
// seeded shop.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use noteastyle::error::{ExtractionError, TranscriptionError};
use noteastyle::model::{Customer, Designer, NewCustomer, NewDesigner, NewShop, Shop};
use noteastyle::voice::{ExtractionCandidate, Extractor, ScopedAudio, Transcriber};
use noteastyle::{Directory, ExtractionPipeline, Store};

/// Transcriber that returns a fixed transcript (or fails) and remembers
/// which temp files it was handed.
pub struct FakeTranscriber {
    transcript: Option<String>,
    delay: Duration,
    seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl FakeTranscriber {
    pub fn says(transcript: &str) -> Arc<Self> {
        Arc::new(Self {
            transcript: Some(transcript.to_string()),
            delay: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            transcript: None,
            delay: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(transcript: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            transcript: Some(transcript.to_string()),
            delay,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Temp file paths received, with whether each existed at call time
    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, audio: &ScopedAudio) -> Result<String, TranscriptionError> {
        self.seen
            .lock()
            .unwrap()
            .push((audio.path().to_path_buf(), audio.path().exists()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.transcript {
            Some(text) => Ok(text.clone()),
            None => Err(TranscriptionError::Rejected {
                status: 400,
                body: "audio could not be decoded".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "fake-transcriber"
    }
}

/// Extractor that answers with a canned model response body.
pub struct FakeExtractor {
    response: Option<String>,
    delay: Duration,
    transcripts: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn responds(json: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Some(json.to_string()),
            delay: Duration::ZERO,
            transcripts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            delay: Duration::ZERO,
            transcripts: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(json: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            response: Some(json.to_string()),
            delay,
            transcripts: Mutex::new(Vec::new()),
        })
    }

    pub fn transcripts(&self) -> Vec<String> {
        self.transcripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(&self, transcript: &str) -> Result<ExtractionCandidate, ExtractionError> {
        self.transcripts.lock().unwrap().push(transcript.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.response {
            Some(body) => ExtractionCandidate::from_json(body),
            None => Err(ExtractionError::Refused("cannot help with that".to_string())),
        }
    }

    fn name(&self) -> &str {
        "fake-extractor"
    }
}

pub fn pipeline(
    transcriber: Arc<FakeTranscriber>,
    extractor: Arc<FakeExtractor>,
) -> ExtractionPipeline {
    ExtractionPipeline::new(transcriber, extractor, Duration::from_secs(5))
}

pub struct Salon {
    pub shop: Shop,
    pub designer: Designer,
    pub customer: Customer,
}

/// One shop with one designer and one customer who has never visited.
pub async fn seed_salon(store: &Store) -> Result<Salon> {
    let directory = Directory::new(store.clone());

    let shop = directory
        .create_shop(NewShop {
            name: "헤어살롱 봄".to_string(),
            shop_type: "hair".to_string(),
            address: Some("서울 마포구".to_string()),
            phone: None,
        })
        .await?;

    let designer = directory
        .create_designer(
            shop.id,
            NewDesigner {
                name: "김지우".to_string(),
                role: None,
                phone: None,
            },
        )
        .await?;

    let customer = directory
        .create_customer(shop.id, new_customer("박서연"))
        .await?;

    Ok(Salon {
        shop,
        designer,
        customer,
    })
}

pub fn new_customer(name: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        phone: Some("010-1234-5678".to_string()),
        gender: None,
        birth_date: None,
        notes: None,
        naver_booking_id: None,
    }
}
