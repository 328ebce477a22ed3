use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// Sample rate of the PCM audio returned by the speech collaborator.
pub const SAMPLE_RATE_HZ: u32 = 24_000;

/// Announcements the client never picked up are dropped after this long.
const ANNOUNCEMENT_MAX_AGE_SECS: i64 = 10 * 60;

struct CachedAnnouncement {
    pcm: Vec<u8>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SpeechResponse {
    /// Base64-encoded 16-bit PCM mono audio at 24kHz.
    audio_content: String,
}

/// Client for the text-to-speech collaborator. Announcements are a
/// non-critical side effect: every failure is logged and swallowed, nothing
/// is ever surfaced to the operator.
pub struct SpeechService {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    announcements: DashMap<Uuid, CachedAnnouncement>,
}

impl SpeechService {
    pub fn new(cfg: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.speech_timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: cfg.speech_api_url.clone(),
            api_key: cfg.speech_api_key.clone(),
            announcements: DashMap::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Fetches and caches the spoken announcement for a completed capture.
    /// Fire-and-forget: failures are logged at warn and never propagated.
    pub async fn announce(&self, capture_id: Uuid, operator_name: &str, cart_id: &str) {
        self.evict_stale(ANNOUNCEMENT_MAX_AGE_SECS);
        match self.fetch(operator_name, cart_id).await {
            Ok(Some(pcm)) => {
                debug!(%capture_id, bytes = pcm.len(), "announcement ready");
                self.announcements.insert(
                    capture_id,
                    CachedAnnouncement {
                        pcm,
                        created_at: Utc::now(),
                    },
                );
            }
            Ok(None) => {}
            Err(e) => warn!(%capture_id, error = %e, "speech announcement failed"),
        }
    }

    /// Decoded PCM for a capture, if an announcement was produced.
    pub fn take_announcement(&self, capture_id: Uuid) -> Option<Vec<u8>> {
        self.announcements.remove(&capture_id).map(|(_, a)| a.pcm)
    }

    /// Drops announcements older than `max_age_secs`. Called before each new
    /// fetch; audio the client never collected would otherwise sit in the
    /// cache forever.
    fn evict_stale(&self, max_age_secs: i64) {
        let cutoff = Utc::now() - chrono::Duration::seconds(max_age_secs);
        self.announcements.retain(|_, a| a.created_at > cutoff);
    }

    async fn fetch(
        &self,
        operator_name: &str,
        cart_id: &str,
    ) -> Result<Option<Vec<u8>>, ServiceError> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(None);
        };

        let text = format!("{operator_name}, carro {cart_id} registrado");
        let mut request = self.client.post(endpoint).json(&json!({
            "text": text,
            "sample_rate": SAMPLE_RATE_HZ,
            "encoding": "pcm_s16le",
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("speech request failed: {e}")))?
            .error_for_status()
            .map_err(|e| ServiceError::ExternalService(format!("speech request failed: {e}")))?;

        let body: SpeechResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("speech response invalid: {e}")))?;

        let pcm = BASE64
            .decode(body.audio_content.as_bytes())
            .map_err(|e| ServiceError::ExternalService(format!("speech audio invalid: {e}")))?;
        Ok(Some(pcm))
    }
}
