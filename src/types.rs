use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schedule::WireTimestamp;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartManualTransferRunsRequest {
    pub requested_run_time: WireTimestamp,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StartManualTransferRunsResponse {
    #[serde(default)]
    pub runs: Vec<TransferRun>,
}

/// See https://cloud.google.com/bigquery/docs/reference/datatransfer/rest/v1/projects.locations.transferConfigs.runs
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRun {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_dataset_id: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}
