//! Call command implementation.

use bazaar_catalog::CatalogLoader;
use bazaar_mcp::ProxyInvoker;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, Render};

/// Parse `--params` into a JSON object.
fn parse_params(params: Option<&str>) -> CliResult<Option<Map<String, Value>>> {
    let Some(raw) = params else {
        return Ok(None);
    };
    match serde_json::from_str(raw)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(CliError::user("--params must be a JSON object")),
    }
}

/// Run one proxied call and render the translated result.
///
/// Ctrl-C cancels the in-flight request.
pub async fn call(
    config: CliConfig,
    format: OutputFormat,
    tool_name: &str,
    params: Option<&str>,
    payment: Option<&str>,
) -> CliResult<String> {
    let parameters = parse_params(params)?;
    let payment: Option<Value> = payment.map(serde_json::from_str).transpose()?;

    let catalog = CatalogLoader::new(config.server_config().catalog).load()?;
    let invoker = ProxyInvoker::new(catalog)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling call");
            on_interrupt.cancel();
        }
    });

    let result = invoker
        .invoke(tool_name, parameters, payment.as_ref(), &cancel)
        .await?;
    info!(
        tool = tool_name,
        is_error = result.is_error,
        payment_required = result.payment_required().is_some(),
        "Call finished"
    );

    Ok(result.render(format))
}
