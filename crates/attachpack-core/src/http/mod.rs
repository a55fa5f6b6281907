//! Blocking HTTP over libcurl, with async wrappers.
//!
//! Requests return [`RemoteError`] on failure so callers can feed them
//! straight into the retry policy. Non-2xx responses carry their status and
//! the most useful message found in the body.

mod parse;

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::retry::RemoteError;

pub(crate) use parse::error_message;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// GET `url`, optionally with a bearer token. Returns the response body.
///
/// Runs in the current thread; use [`get_json`] from async code.
pub fn get(url: &str, bearer: Option<&str>) -> Result<Vec<u8>, RemoteError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    easy.timeout(REQUEST_TIMEOUT)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    if let Some(token) = bearer {
        list.append(&format!("Authorization: Bearer {token}"))?;
    }
    easy.http_headers(list)?;

    perform(&mut easy)
}

/// POST an `application/x-www-form-urlencoded` body. Returns the response body.
pub fn post_form(url: &str, form: &[(String, String)]) -> Result<Vec<u8>, RemoteError> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.post(true)?;
    easy.post_fields_copy(body.as_bytes())?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    easy.timeout(REQUEST_TIMEOUT)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    list.append("Content-Type: application/x-www-form-urlencoded")?;
    easy.http_headers(list)?;

    perform(&mut easy)
}

fn perform(easy: &mut curl::easy::Easy) -> Result<Vec<u8>, RemoteError> {
    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        let status = u16::try_from(code).unwrap_or(u16::MAX);
        return Err(RemoteError::http(status, error_message(code, &body)));
    }
    Ok(body)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RemoteError> {
    serde_json::from_slice(body)
        .map_err(|e| RemoteError::other(format!("invalid JSON response: {e}")))
}

fn join_error(e: tokio::task::JoinError) -> RemoteError {
    RemoteError::other(format!("HTTP worker failed: {e}"))
}

/// GET and decode a JSON body on the blocking pool.
pub async fn get_json<T>(url: String, bearer: Option<String>) -> Result<T, RemoteError>
where
    T: DeserializeOwned,
{
    let body = tokio::task::spawn_blocking(move || get(&url, bearer.as_deref()))
        .await
        .map_err(join_error)??;
    decode(&body)
}

/// POST a form and decode the JSON response on the blocking pool.
pub async fn post_form_json<T>(url: String, form: Vec<(String, String)>) -> Result<T, RemoteError>
where
    T: DeserializeOwned,
{
    let body = tokio::task::spawn_blocking(move || post_form(&url, &form))
        .await
        .map_err(join_error)??;
    decode(&body)
}
