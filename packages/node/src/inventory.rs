//! JSON:API shapes of the inventory records: resource schemas for `devices`
//! and `channels`, and the hydrators that read their create documents.

use jsonapi_core::{
    resource, BooleanField, Context, CrudTable, Field, HasIdentifier, Hydrator, NumberField,
    Relationship, ResourceSchema, SchemaBase, SchemaContainer, TextField,
};
use jsonapi_document::Meta;
use serde_json::Value;

use crate::storage::{Channel, Device};

pub const DEVICES: &str = "devices";
pub const CHANNELS: &str = "channels";

/// A device as encoded. `channels: None` leaves the relationship as links only.
#[derive(Debug, Clone)]
pub struct DeviceResource {
    pub device: Device,
    pub channels: Option<Vec<Channel>>,
}

impl DeviceResource {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            channels: None,
        }
    }

    pub fn with_channels(mut self, channels: Vec<Channel>) -> Self {
        self.channels = Some(channels);
        self
    }
}

/// A channel as encoded, together with its owning device.
#[derive(Debug, Clone)]
pub struct ChannelResource {
    pub channel: Channel,
    pub device: Device,
}

impl HasIdentifier for DeviceResource {
    fn identifier(&self) -> Option<String> {
        Some(self.device.id.clone())
    }
}

impl HasIdentifier for ChannelResource {
    fn identifier(&self) -> Option<String> {
        Some(self.channel.id.clone())
    }
}

fn optional<T: Into<Value>>(value: Option<T>) -> Value {
    value.map_or(Value::Null, Into::into)
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

pub struct DeviceSchema {
    base: SchemaBase,
}

impl Default for DeviceSchema {
    fn default() -> Self {
        Self {
            base: SchemaBase::new(DEVICES),
        }
    }
}

impl ResourceSchema for DeviceSchema {
    type Resource = DeviceResource;

    fn base(&self) -> &SchemaBase {
        &self.base
    }

    fn attributes(&self, resource: &DeviceResource, _: &Context) -> Meta {
        let device = &resource.device;
        let mut attrs = Meta::new();
        attrs.insert("identifier".into(), device.identifier.clone().into());
        attrs.insert("name".into(), optional(device.name.clone()));
        attrs.insert("enabled".into(), device.enabled.into());
        attrs.insert("priority".into(), optional(device.priority));
        attrs.insert("createdAt".into(), device.created_at.clone().into());
        attrs
    }

    fn relationships(&self, encoded: &DeviceResource, _: &Context) -> Vec<(String, Relationship)> {
        let channels = match &encoded.channels {
            Some(channels) => Relationship::to_many(
                channels
                    .iter()
                    .map(|channel| {
                        resource(ChannelResource {
                            channel: channel.clone(),
                            device: encoded.device.clone(),
                        })
                    })
                    .collect(),
            ),
            None => Relationship::links_only(),
        };
        vec![(CHANNELS.into(), channels)]
    }
}

pub struct ChannelSchema {
    base: SchemaBase,
}

impl Default for ChannelSchema {
    fn default() -> Self {
        Self {
            base: SchemaBase::new(CHANNELS),
        }
    }
}

impl ResourceSchema for ChannelSchema {
    type Resource = ChannelResource;

    fn base(&self) -> &SchemaBase {
        &self.base
    }

    fn attributes(&self, resource: &ChannelResource, _: &Context) -> Meta {
        let channel = &resource.channel;
        let mut attrs = Meta::new();
        attrs.insert("identifier".into(), channel.identifier.clone().into());
        attrs.insert("name".into(), optional(channel.name.clone()));
        attrs.insert("unit".into(), optional(channel.unit.clone()));
        attrs.insert("step".into(), optional(channel.step));
        attrs.insert("createdAt".into(), channel.created_at.clone().into());
        attrs
    }

    fn relationships(&self, encoded: &ChannelResource, _: &Context) -> Vec<(String, Relationship)> {
        let device = resource(DeviceResource::new(encoded.device.clone()));
        vec![("device".into(), Relationship::to_one(Some(device)))]
    }
}

/// Schema registry with every inventory resource type.
pub fn schemas() -> SchemaContainer {
    let mut container = SchemaContainer::new();
    container
        .register(DeviceSchema::default())
        .register(ChannelSchema::default());
    container
}

// ---------------------------------------------------------------------------
// Hydrators
// ---------------------------------------------------------------------------

/// Create-document readers, built once at startup.
#[derive(Debug, Clone)]
pub struct Hydrators {
    pub devices: Hydrator,
    pub channels: Hydrator,
}

impl Default for Hydrators {
    fn default() -> Self {
        Self {
            devices: device_hydrator(),
            channels: channel_hydrator(),
        }
    }
}

fn device_hydrator() -> Hydrator {
    let crud = CrudTable::new()
        .with_field("identifier", true, true)
        .with_field("name", false, true)
        .with_field("enabled", false, true)
        .with_field("priority", false, true);
    Hydrator::new(DEVICES)
        .field(TextField::new(Field::from_crud("identifier", "identifier", &crud), false))
        .field(TextField::new(Field::from_crud("name", "name", &crud), true))
        .field(BooleanField::new(Field::from_crud("enabled", "enabled", &crud), false))
        .field(NumberField::integer(Field::from_crud("priority", "priority", &crud), true))
}

fn channel_hydrator() -> Hydrator {
    let crud = CrudTable::new()
        .with_field("identifier", true, true)
        .with_field("name", false, true)
        .with_field("unit", false, true)
        .with_field("step", false, true);
    Hydrator::new(CHANNELS)
        .field(TextField::new(Field::from_crud("identifier", "identifier", &crud), false))
        .field(TextField::new(Field::from_crud("name", "name", &crud), true))
        .field(TextField::new(Field::from_crud("unit", "unit", &crud), true))
        .field(NumberField::decimal(Field::from_crud("step", "step", &crud), true))
}
