use serde_json::Value;
use tracing::debug;

use super::ApiClientError;

/// Extracts the `result` list of a Badgr response envelope.
///
/// Badgr wraps list, fetch and create responses as `{"result": [...]}`.
pub(crate) fn results(path: &str, value: Value) -> Result<Vec<Value>, ApiClientError> {
    let Value::Object(mut envelope) = value else {
        return Err(ApiClientError::unexpected_response(
            path,
            "expected a JSON object",
        ));
    };

    match envelope.remove("result") {
        Some(Value::Array(items)) => {
            debug!(%path, count = items.len(), "results received");
            Ok(items)
        }
        Some(_) => Err(ApiClientError::unexpected_response(
            path,
            "'result' is not a list",
        )),
        None => Err(ApiClientError::unexpected_response(
            path,
            "missing 'result' field",
        )),
    }
}

/// Extracts the only element of the `result` list.
pub(crate) fn single_result(path: &str, value: Value) -> Result<Value, ApiClientError> {
    let mut items = results(path, value)?;
    if items.len() != 1 {
        return Err(ApiClientError::unexpected_response(
            path,
            format!("expected exactly one result, got {}", items.len()),
        ));
    }
    Ok(items.remove(0))
}
