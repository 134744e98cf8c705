//! `Accept` header negotiation for generated responses.

use http::header::ACCEPT;
use http::HeaderMap;
use mime::Mime;

/// Returns true if the most preferred media range of the `Accept` header is JSON.
///
/// JSON means `application/json` or any `+json` structured-syntax suffix; parameters after `;`
/// are ignored except `q`. The highest `q` wins and ties go to the earlier entry. Entries that do
/// not parse as a media type are skipped.
pub fn prefers_json(headers: &HeaderMap) -> bool {
    preferred_media_type(headers).is_some_and(|mime| is_json(&mime))
}

fn preferred_media_type(headers: &HeaderMap) -> Option<Mime> {
    let mut best: Option<(f32, Mime)> = None;

    for value in headers.get_all(ACCEPT) {
        let Ok(value) = value.to_str() else {
            continue;
        };

        for entry in value.split(',') {
            let Ok(mime) = entry.trim().parse::<Mime>() else {
                continue;
            };
            let quality = quality(&mime);
            if best.as_ref().is_none_or(|(best_quality, _)| quality > *best_quality) {
                best = Some((quality, mime));
            }
        }
    }

    best.map(|(_, mime)| mime)
}

fn quality(mime: &Mime) -> f32 {
    mime.get_param("q").and_then(|q| q.as_str().parse::<f32>().ok()).unwrap_or(1.0)
}

fn is_json(mime: &Mime) -> bool {
    mime.essence_str() == mime::APPLICATION_JSON.essence_str() || mime.suffix() == Some(mime::JSON)
}
