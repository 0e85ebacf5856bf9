use bqtransfer::APP_NAME;
use bqtransfer::config::TransferConfig;
use bqtransfer::transfer::DataTransferClient;
use bqtransfer::trigger_manual_run;
use bqtransfer::types::StartManualTransferRunsResponse;
use jluszcz_rust_utils::lambda;
use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    lambda::init(APP_NAME, module_path!(), false).await?;
    let func = service_fn(handler);
    lambda_runtime::run(func).await?;
    Ok(())
}

async fn handler(
    _event: LambdaEvent<Value>,
) -> Result<StartManualTransferRunsResponse, lambda_runtime::Error> {
    let config = TransferConfig::from_env()?;
    let client = DataTransferClient::from_env().await?;

    let response = trigger_manual_run(&client, &config, chrono::Utc::now()).await?;

    Ok(response)
}
