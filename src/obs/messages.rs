use serde::{Deserialize, Serialize};

/// Identify sent once after the socket opens
pub const OP_IDENTIFY: u8 = 1;
/// Server acknowledgement of Identify
pub const OP_IDENTIFIED: u8 = 2;
pub const OP_REQUEST: u8 = 6;
pub const OP_REQUEST_RESPONSE: u8 = 7;

/// Status code the capture tool uses for a successful request
pub const STATUS_SUCCESS: i64 = 100;

pub const TRIGGER_HOTKEY_REQUEST: &str = "TriggerHotkeyByKeySequence";

/// Envelope for every outgoing message: `{"op":<n>,"d":{...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub op: u8,
    pub d: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentifyData {
    #[serde(rename = "rpcVersion")]
    pub rpc_version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestData {
    #[serde(rename = "requestType")]
    pub request_type: String,
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "requestData")]
    pub request_data: HotkeyData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HotkeyData {
    #[serde(rename = "keyId")]
    pub key_id: String,
}

/// Any message received from the server; `d` is decoded per opcode
#[derive(Debug, Deserialize)]
pub struct Incoming {
    pub op: u8,
    #[serde(default)]
    pub d: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RequestResponse {
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
    #[serde(rename = "requestStatus")]
    pub request_status: RequestStatus,
}

#[derive(Debug, Deserialize)]
pub struct RequestStatus {
    pub code: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Envelope<IdentifyData> {
    pub fn identify() -> Self {
        Self {
            op: OP_IDENTIFY,
            d: IdentifyData { rpc_version: 1 },
        }
    }
}

impl Envelope<RequestData> {
    pub fn trigger_hotkey(request_id: String, key_id: &str) -> Self {
        Self {
            op: OP_REQUEST,
            d: RequestData {
                request_type: TRIGGER_HOTKEY_REQUEST.to_string(),
                request_id,
                request_data: HotkeyData {
                    key_id: key_id.to_string(),
                },
            },
        }
    }
}
