//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use chrono::Utc;
use ocsw_yang::{Path, YANG_ENCODINGS, YANG_IMPLEMENTED_MODULES};
use serde_json::Value;
use tonic::{Request, Response, Status};
use tracing::{debug, debug_span, trace};

use crate::northbound::Northbound;
use crate::northbound::client::api::{CommitConfiguration, Edit};

pub const GNMI_VERSION: &str = "0.8.1";

// gNMI messages, restricted to the fields the service makes use of.
//
// The messages are written by hand rather than generated from the gNMI
// protobuf definitions. No gRPC server is bundled: the service is invoked
// in-process through `GnmiService`, by the diagnostic shell and the tests.
pub mod proto {
    use ocsw_yang::Path;

    #[derive(Clone, Debug, Default)]
    pub struct CapabilityRequest {}

    #[derive(Clone, Debug, Default)]
    pub struct CapabilityResponse {
        pub supported_models: Vec<ModelData>,
        pub supported_encodings: Vec<Encoding>,
        pub g_nmi_version: String,
    }

    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct ModelData {
        pub name: String,
        pub organization: String,
        pub version: String,
    }

    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum Encoding {
        #[default]
        Json,
        Bytes,
        Proto,
        Ascii,
        JsonIetf,
    }

    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum DataType {
        #[default]
        All,
        Config,
        State,
        Operational,
    }

    #[derive(Clone, Debug, Default)]
    pub struct GetRequest {
        pub prefix: Option<Path>,
        pub path: Vec<Path>,
        pub r#type: DataType,
        pub encoding: Encoding,
    }

    #[derive(Clone, Debug, Default)]
    pub struct GetResponse {
        pub notification: Vec<Notification>,
    }

    #[derive(Clone, Debug, Default)]
    pub struct Notification {
        pub timestamp: i64,
        pub prefix: Option<Path>,
        pub update: Vec<Update>,
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Update {
        pub path: Option<Path>,
        pub val: Option<TypedValue>,
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum TypedValue {
        StringVal(String),
        IntVal(i64),
        UintVal(u64),
        BoolVal(bool),
        DoubleVal(f64),
        JsonVal(Vec<u8>),
        JsonIetfVal(Vec<u8>),
    }

    #[derive(Clone, Debug, Default)]
    pub struct SetRequest {
        pub prefix: Option<Path>,
        pub delete: Vec<Path>,
        pub replace: Vec<Update>,
        pub update: Vec<Update>,
    }

    #[derive(Clone, Debug, Default)]
    pub struct SetResponse {
        pub prefix: Option<Path>,
        pub response: Vec<UpdateResult>,
        pub timestamp: i64,
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct UpdateResult {
        pub path: Option<Path>,
        pub op: Operation,
    }

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum Operation {
        Delete,
        Replace,
        Update,
    }

    #[derive(Clone, Debug, Default)]
    pub struct SubscribeRequest {}

    #[derive(Clone, Debug, Default)]
    pub struct SubscribeResponse {}

    // ===== impl Encoding =====

    impl Encoding {
        pub fn from_str_name(value: &str) -> Option<Encoding> {
            match value {
                "JSON" => Some(Encoding::Json),
                "BYTES" => Some(Encoding::Bytes),
                "PROTO" => Some(Encoding::Proto),
                "ASCII" => Some(Encoding::Ascii),
                "JSON_IETF" => Some(Encoding::JsonIetf),
                _ => None,
            }
        }
    }
}

#[derive(Debug)]
pub struct GnmiService {
    nb: Arc<Northbound>,
}

// ===== impl GnmiService =====

impl GnmiService {
    pub fn new(nb: Arc<Northbound>) -> GnmiService {
        GnmiService { nb }
    }

    pub async fn capabilities(
        &self,
        grpc_request: Request<proto::CapabilityRequest>,
    ) -> Result<Response<proto::CapabilityResponse>, Status> {
        let grpc_request = grpc_request.into_inner();
        debug_span!("northbound").in_scope(|| {
            debug_span!("client", name = "gnmi").in_scope(|| {
                debug!("received Capabilities() request");
                trace!("{:?}", grpc_request);
            });
        });

        // Fill-in supported YANG modules.
        let supported_models = YANG_IMPLEMENTED_MODULES
            .iter()
            .map(|module| proto::ModelData {
                name: module.name.to_owned(),
                organization: module.organization.to_owned(),
                version: module.version.to_owned(),
            })
            .collect();

        // Fill-in supported data encodings.
        let supported_encodings = YANG_ENCODINGS
            .iter()
            .filter_map(|encoding| proto::Encoding::from_str_name(encoding))
            .collect();

        let reply = proto::CapabilityResponse {
            g_nmi_version: GNMI_VERSION.to_owned(),
            supported_models,
            supported_encodings,
        };

        Ok(Response::new(reply))
    }

    pub async fn get(
        &self,
        grpc_request: Request<proto::GetRequest>,
    ) -> Result<Response<proto::GetResponse>, Status> {
        let grpc_request = grpc_request.into_inner();
        debug_span!("northbound").in_scope(|| {
            debug_span!("client", name = "gnmi").in_scope(|| {
                debug!("received Get() request");
                trace!("{:?}", grpc_request);
            });
        });

        // Only configuration data is available.
        match grpc_request.r#type {
            proto::DataType::All | proto::DataType::Config => (),
            proto::DataType::State | proto::DataType::Operational => {
                return Err(Status::unimplemented(
                    "Operational data is not supported",
                ));
            }
        }

        // Get encoding type.
        let encoding = grpc_request.encoding;
        if !matches!(
            encoding,
            proto::Encoding::Json | proto::Encoding::JsonIetf
        ) {
            return Err(Status::invalid_argument("Invalid data encoding"));
        }

        let mut notification = vec![];
        for entry in &grpc_request.path {
            let path = Path::join(grpc_request.prefix.as_ref(), entry);
            let value = self.nb.get(&path).await?;
            let val = gen_typed_value(value, encoding)?;

            // Fill-in gNMI response for this path.
            notification.push(proto::Notification {
                timestamp: get_timestamp(),
                prefix: None,
                update: vec![proto::Update {
                    path: Some(path),
                    val: Some(val),
                }],
            });
        }

        let grpc_response = proto::GetResponse { notification };
        Ok(Response::new(grpc_response))
    }

    pub async fn set(
        &self,
        grpc_request: Request<proto::SetRequest>,
    ) -> Result<Response<proto::SetResponse>, Status> {
        let grpc_request = grpc_request.into_inner();
        debug_span!("northbound").in_scope(|| {
            debug_span!("client", name = "gnmi").in_scope(|| {
                debug!("received Set() request");
                trace!("{:?}", grpc_request);
            });
        });

        let prefix = grpc_request.prefix.as_ref();
        let mut edits = vec![];
        let mut response = vec![];

        // Paths to be deleted from the data tree.
        for entry in grpc_request.delete {
            edits.push(Edit::Delete(Path::join(prefix, &entry)));
            response.push(proto::UpdateResult {
                path: Some(entry),
                op: proto::Operation::Delete,
            });
        }

        // Subtrees to be replaced, followed by subtrees to be merged.
        for (entry, op) in grpc_request
            .replace
            .into_iter()
            .map(|entry| (entry, proto::Operation::Replace))
            .chain(
                grpc_request
                    .update
                    .into_iter()
                    .map(|entry| (entry, proto::Operation::Update)),
            )
        {
            let Some(path) = entry.path else {
                return Err(Status::invalid_argument("Missing 'path' field"));
            };
            let Some(val) = entry.val else {
                return Err(Status::invalid_argument("Missing 'val' field"));
            };
            let value = val.into_json()?;
            let full_path = Path::join(prefix, &path);
            edits.push(match op {
                proto::Operation::Replace => Edit::Replace(full_path, value),
                _ => Edit::Update(full_path, value),
            });
            response.push(proto::UpdateResult {
                path: Some(path),
                op,
            });
        }

        // Relay the edits to the northbound.
        let config = CommitConfiguration::Edit(edits);
        let nb_response = self.nb.commit(config, "").await?;
        debug_span!("northbound").in_scope(|| {
            debug_span!("client", name = "gnmi").in_scope(|| {
                debug!(
                    transaction_id = %nb_response.transaction_id,
                    "Set() request completed"
                );
            });
        });

        let reply = proto::SetResponse {
            prefix: grpc_request.prefix,
            response,
            timestamp: get_timestamp(),
        };
        Ok(Response::new(reply))
    }

    pub async fn subscribe(
        &self,
        _grpc_request: Request<proto::SubscribeRequest>,
    ) -> Result<Response<proto::SubscribeResponse>, Status> {
        Err(Status::unimplemented("Subscribe() is not supported"))
    }
}

// ===== impl proto::TypedValue =====

impl proto::TypedValue {
    fn into_json(self) -> Result<Value, Status> {
        use proto::TypedValue;

        let value = match self {
            TypedValue::StringVal(v) => Value::from(v),
            TypedValue::IntVal(v) => Value::from(v),
            TypedValue::UintVal(v) => Value::from(v),
            TypedValue::BoolVal(v) => Value::from(v),
            TypedValue::DoubleVal(v) => serde_json::Number::from_f64(v)
                .map(Value::Number)
                .ok_or_else(|| Status::invalid_argument("Invalid number"))?,
            TypedValue::JsonVal(v) | TypedValue::JsonIetfVal(v) => {
                serde_json::from_slice(&v).map_err(|error| {
                    Status::invalid_argument(error.to_string())
                })?
            }
        };
        Ok(value)
    }
}

// ===== global functions =====

// Scalar leaves are returned as typed values, everything else as encoded
// JSON.
fn gen_typed_value(
    value: Value,
    encoding: proto::Encoding,
) -> Result<proto::TypedValue, Status> {
    let val = match value {
        Value::Bool(v) => proto::TypedValue::BoolVal(v),
        Value::String(v) => proto::TypedValue::StringVal(v),
        Value::Number(v) => {
            if let Some(v) = v.as_u64() {
                proto::TypedValue::UintVal(v)
            } else if let Some(v) = v.as_i64() {
                proto::TypedValue::IntVal(v)
            } else {
                proto::TypedValue::DoubleVal(v.as_f64().unwrap_or_default())
            }
        }
        value => {
            let data = serde_json::to_vec(&value)
                .map_err(|error| Status::internal(error.to_string()))?;
            match encoding {
                proto::Encoding::Json => proto::TypedValue::JsonVal(data),
                _ => proto::TypedValue::JsonIetfVal(data),
            }
        }
    };
    Ok(val)
}

fn get_timestamp() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

// ===== unit tests =====
