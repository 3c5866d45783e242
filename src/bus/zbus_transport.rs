// Sysbus Gateway - D-Bus Transport
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! [`Bus`] implementation over an async zbus connection.

use tracing::info;
use zbus::message::Body;
use zbus::zvariant::{
    self, Array, OwnedValue, Signature, Structure, StructureBuilder, StructureSeed, Value,
};
use zbus::Connection;

use super::{Bus, BusObject, ObjectPath, Variant, PROPERTIES_INTERFACE};
use crate::error::BusError;

/// A shared zbus connection.
///
/// zbus multiplexes concurrent calls over one connection, so a single
/// instance serves every gateway and proxy.
#[derive(Debug, Clone)]
pub struct ZbusBus {
    connection: Connection,
}

impl ZbusBus {
    /// Connect to the system bus.
    pub async fn system() -> Result<Self, BusError> {
        info!("Connecting to system D-Bus...");
        let connection = Connection::system().await?;
        Ok(Self { connection })
    }

    /// Connect to the session bus.
    pub async fn session() -> Result<Self, BusError> {
        info!("Connecting to session D-Bus...");
        let connection = Connection::session().await?;
        Ok(Self { connection })
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl Bus for ZbusBus {
    async fn call(
        &self,
        object: &BusObject,
        interface: &str,
        member: &str,
        args: Vec<Variant>,
    ) -> Result<Vec<Variant>, BusError> {
        let destination = object.destination.as_str();
        let path = object.path.as_str();

        let reply = if args.is_empty() {
            self.connection
                .call_method(Some(destination), path, Some(interface), member, &())
                .await?
        } else {
            // A structure body is sent as one argument per field.
            let body = encode_args(&args)?;
            self.connection
                .call_method(Some(destination), path, Some(interface), member, &body)
                .await?
        };

        decode_body(&reply.body())
    }

    async fn get_property(
        &self,
        object: &BusObject,
        interface: &str,
        property: &str,
    ) -> Result<Variant, BusError> {
        let value: OwnedValue = self
            .connection
            .call_method(
                Some(object.destination.as_str()),
                object.path.as_str(),
                Some(PROPERTIES_INTERFACE),
                "Get",
                &(interface, property),
            )
            .await?
            .body()
            .deserialize()?;

        Ok(from_value(&value))
    }
}

impl From<zbus::Error> for BusError {
    fn from(err: zbus::Error) -> Self {
        match err {
            zbus::Error::MethodError(name, detail, _) => {
                BusError::remote(name.to_string(), detail.unwrap_or_default())
            }
            other => BusError::transport(other.to_string()),
        }
    }
}

impl From<zvariant::Error> for BusError {
    fn from(err: zvariant::Error) -> Self {
        BusError::transport(err.to_string())
    }
}

/// Split a message body into its arguments.
fn decode_body(body: &Body) -> Result<Vec<Variant>, BusError> {
    let signature = match body.signature() {
        Some(signature) if !signature.as_str().is_empty() => signature.to_string(),
        _ => return Ok(Vec::new()),
    };

    // The body signature lists the arguments without enclosing parens; a
    // lone struct argument must stay one field.
    let seed = StructureSeed::try_from(Signature::try_from(format!("({})", signature))?)?;
    let (arguments, _) = body.data().deserialize_with_seed(seed)?;
    Ok(arguments.fields().iter().map(from_value).collect())
}

fn encode_args(args: &[Variant]) -> Result<Structure<'static>, zvariant::Error> {
    let mut builder = StructureBuilder::new();
    for arg in args {
        builder = builder.append_field(to_value(arg)?);
    }
    Ok(builder.build())
}

fn to_value(variant: &Variant) -> Result<Value<'static>, zvariant::Error> {
    let value = match variant {
        Variant::Bool(v) => Value::Bool(*v),
        Variant::Byte(v) => Value::U8(*v),
        Variant::I32(v) => Value::I32(*v),
        Variant::U32(v) => Value::U32(*v),
        Variant::I64(v) => Value::I64(*v),
        Variant::U64(v) => Value::U64(*v),
        Variant::F64(v) => Value::F64(*v),
        Variant::Str(v) => Value::from(v.clone()),
        Variant::ObjectPath(path) => {
            Value::ObjectPath(zvariant::ObjectPath::try_from(path.as_str().to_string())?)
        }
        Variant::Array { element, items } => {
            let mut array = Array::new(Signature::try_from(element.clone())?);
            for item in items {
                array.append(to_value(item)?)?;
            }
            Value::Array(array)
        }
        Variant::Struct(fields) if fields.is_empty() => {
            return Err(zvariant::Error::Message(
                "cannot encode an empty structure".to_string(),
            ))
        }
        Variant::Struct(fields) => Value::Structure(encode_args(fields)?),
        Variant::Boxed(inner) => Value::Value(Box::new(to_value(inner)?)),
        Variant::Opaque(signature) => {
            return Err(zvariant::Error::Message(format!(
                "cannot encode opaque value of type '{}'",
                signature
            )))
        }
    };
    Ok(value)
}

fn from_value(value: &Value<'_>) -> Variant {
    match value {
        Value::U8(v) => Variant::Byte(*v),
        Value::Bool(v) => Variant::Bool(*v),
        Value::I32(v) => Variant::I32(*v),
        Value::U32(v) => Variant::U32(*v),
        Value::I64(v) => Variant::I64(*v),
        Value::U64(v) => Variant::U64(*v),
        Value::F64(v) => Variant::F64(*v),
        Value::Str(v) => Variant::Str(v.to_string()),
        Value::ObjectPath(path) => Variant::ObjectPath(ObjectPath::new(path.as_str())),
        Value::Array(array) => Variant::Array {
            element: array.element_signature().to_string(),
            items: array.iter().map(from_value).collect(),
        },
        Value::Structure(structure) => {
            Variant::Struct(structure.fields().iter().map(from_value).collect())
        }
        Value::Value(inner) => Variant::Boxed(Box::new(from_value(inner))),
        other => Variant::Opaque(other.value_signature().to_string()),
    }
}
