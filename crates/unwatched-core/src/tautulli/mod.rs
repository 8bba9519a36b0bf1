//! Tautulli API client.
//!
//! Every call is a blocking GET against `<base_url>/api/v2` with `apikey` and
//! `cmd` query parameters. The `try_*` methods surface failures; the
//! [`MetadataSource`] implementation downgrades them to empty results so a
//! single failing library or item never stops a run.

pub mod models;

use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TautulliConfig;
use crate::error::Error;
use models::{
    Envelope, LibrarySummary, MediaDetailRecord, MediaSummaryRecord, MediaType, RatingKey,
};

/// Read-only view of the remote library the candidate engine works against.
pub trait MetadataSource {
    /// All library sections. Empty when the server cannot be reached.
    fn list_libraries(&self) -> Vec<LibrarySummary>;

    /// Media summaries of one section. Empty on failure.
    fn list_library_media(&self, section_id: i64) -> Vec<MediaSummaryRecord>;

    /// Leaf identifiers below a show. Empty when the item has no cached children.
    fn expand_container(&self, rating_key: RatingKey, media_type: MediaType) -> Vec<RatingKey>;

    /// Full record for one leaf, `None` when it does not resolve to a file.
    fn get_detail(&self, rating_key: RatingKey) -> Option<MediaDetailRecord>;
}

pub struct TautulliClient {
    client: Client,
    endpoint: String,
    api_key: String,
    media_page_length: u32,
}

impl TautulliClient {
    pub fn new(config: &TautulliConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/v2", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            media_page_length: config.media_page_length,
        })
    }

    fn fetch(&self, command: &'static str, params: &[(&str, String)]) -> Result<Value, Error> {
        debug!(command, ?params, "Requesting Tautulli");
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("apikey", self.api_key.as_str()), ("cmd", command)])
            .query(params)
            .send()?
            .error_for_status()?
            .text()?;
        let envelope: Envelope = serde_json::from_str(&body)
            .map_err(|source| Error::MalformedResponse { command, source })?;
        envelope.into_data(command)
    }

    pub fn try_list_libraries(&self) -> Result<Vec<LibrarySummary>, Error> {
        models::decode_libraries(self.fetch("get_libraries_table", &[])?)
    }

    pub fn try_list_library_media(&self, section_id: i64) -> Result<Vec<MediaSummaryRecord>, Error> {
        let data = self.fetch(
            "get_library_media_info",
            &[
                ("section_id", section_id.to_string()),
                ("length", self.media_page_length.to_string()),
                ("refresh", "true".to_string()),
            ],
        )?;
        models::decode_library_media(data)
    }

    pub fn try_expand_container(
        &self,
        rating_key: RatingKey,
        media_type: MediaType,
    ) -> Result<Vec<RatingKey>, Error> {
        let data = self.fetch(
            "get_new_rating_keys",
            &[
                ("rating_key", rating_key.to_string()),
                ("media_type", media_type.as_str().to_string()),
            ],
        )?;
        models::decode_new_rating_keys(data)
    }

    pub fn try_get_detail(&self, rating_key: RatingKey) -> Result<Option<MediaDetailRecord>, Error> {
        let data = self.fetch(
            "get_metadata",
            &[
                ("rating_key", rating_key.to_string()),
                ("media_info", "true".to_string()),
            ],
        )?;
        models::decode_metadata(data)
    }
}

impl MetadataSource for TautulliClient {
    fn list_libraries(&self) -> Vec<LibrarySummary> {
        self.try_list_libraries().unwrap_or_else(|e| {
            warn!("Tautulli API 'get_libraries_table' request failed: {}", e);
            Vec::new()
        })
    }

    fn list_library_media(&self, section_id: i64) -> Vec<MediaSummaryRecord> {
        self.try_list_library_media(section_id).unwrap_or_else(|e| {
            warn!(
                section_id,
                "Tautulli API 'get_library_media_info' request failed: {}", e
            );
            Vec::new()
        })
    }

    fn expand_container(&self, rating_key: RatingKey, media_type: MediaType) -> Vec<RatingKey> {
        self.try_expand_container(rating_key, media_type)
            .unwrap_or_else(|e| {
                warn!(
                    %rating_key,
                    "Tautulli API 'get_new_rating_keys' request failed: {}", e
                );
                Vec::new()
            })
    }

    fn get_detail(&self, rating_key: RatingKey) -> Option<MediaDetailRecord> {
        match self.try_get_detail(rating_key) {
            Ok(detail) => detail,
            Err(e) => {
                debug!(%rating_key, "Tautulli API 'get_metadata' request failed: {}", e);
                None
            }
        }
    }
}
