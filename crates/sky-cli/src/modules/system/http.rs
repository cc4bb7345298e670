use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use tracing::debug;

pub(crate) const ACCOUNT_ID_HEADER: &str = "x-skyflow-account-id";

pub(crate) fn auth_headers(token: &str, account_id: Option<&str>) -> anyhow::Result<HeaderMap> {
    if token.trim().is_empty() {
        anyhow::bail!("token is required (SKYFLOW_BEARER_TOKEN, --bearer-token, or sky configure)");
    }
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}"))?,
    );
    if let Some(account_id) = account_id {
        headers.insert(
            HeaderName::from_static(ACCOUNT_ID_HEADER),
            HeaderValue::from_str(account_id)?,
        );
    }
    Ok(headers)
}

pub(crate) async fn send_request(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    headers: HeaderMap,
    payload: Option<&serde_json::Value>,
) -> reqwest::Result<reqwest::Response> {
    let method_clone = method.clone();
    let builder = client.request(method, url).headers(headers);
    let builder = if let Some(payload) = payload {
        builder.json(payload)
    } else {
        builder
    };
    debug!(method = %method_clone, url = %url, "http request");
    let start = std::time::Instant::now();
    let response = builder.send().await?;
    debug!(
        method = %method_clone,
        url = %url,
        status = %response.status(),
        elapsed_ms = start.elapsed().as_millis(),
        "http response"
    );
    Ok(response)
}

pub(crate) fn append_params(url: &mut String, params: &[(&str, &str)]) {
    if params.is_empty() {
        return;
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<String>>()
        .join("&");
    url.push('?');
    url.push_str(&query);
}
