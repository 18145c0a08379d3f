//! Loading and decoding every embedded image before capture.
//!
//! Each distinct `src` gets its own blocking task. Failures never abort the capture:
//! an image that cannot be loaded or decoded is settled as failed and the rasterizer
//! paints without it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use folio_style::StyledNode;
use folio_traits::{ImageSettlement, ResourceProvider, SettledImages};
use folio_types::ImageSrc;
use log::{debug, warn};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Decodes the payload of a `data:` URI. Non-base64 payloads are taken verbatim.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, String> {
    let body = uri
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let (header, payload) = body
        .split_once(',')
        .ok_or_else(|| "data URI has no payload".to_string())?;
    if header.ends_with(";base64") {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| format!("invalid base64 payload: {}", e))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

fn load_and_decode(provider: &dyn ResourceProvider, src: &ImageSrc) -> ImageSettlement {
    let bytes = if src.is_data_uri() {
        decode_data_uri(src.as_str())
    } else {
        provider
            .load(src.as_str())
            .map(|data| data.as_ref().clone())
            .map_err(|e| e.to_string())
    };
    match bytes.and_then(|bytes| image::load_from_memory(&bytes).map_err(|e| e.to_string())) {
        Ok(decoded) => ImageSettlement::Loaded(Arc::new(decoded.to_rgba8())),
        Err(reason) => ImageSettlement::Failed(reason),
    }
}

/// Settles every distinct image source in the subtree.
///
/// Returns once all sources are settled. Dropping the returned future aborts the
/// sources still in flight.
pub async fn settle_images(node: &StyledNode, provider: Arc<dyn ResourceProvider>) -> SettledImages {
    let sources = node.image_sources();
    let mut settled = SettledImages::new();
    if sources.is_empty() {
        return settled;
    }
    debug!("Settling {} image source(s) via {}", sources.len(), provider.name());

    let mut tasks = JoinSet::new();
    for src in sources.iter().cloned() {
        let provider = Arc::clone(&provider);
        tasks.spawn_blocking(move || {
            let settlement = load_and_decode(provider.as_ref(), &src);
            (src, settlement)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((src, settlement)) => {
                if let ImageSettlement::Failed(reason) = &settlement {
                    warn!("Image '{}' failed to load, capturing without it: {}", src, reason);
                }
                settled.insert(src, settlement);
            }
            Err(e) => warn!("Image settle task did not complete: {}", e),
        }
    }

    for src in sources {
        settled
            .entry(src)
            .or_insert_with(|| ImageSettlement::Failed("settle task did not complete".to_string()));
    }
    settled
}
