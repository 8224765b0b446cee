// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service/plugin descriptors, the immutable registry, and catalog queries.
//!
//! Services group plugins and may point at a remote environment that executes
//! them. The [`Registry`] is built once through [`RegistryBuilder`]; the
//! [`Catalog`] publishes it to concurrent readers and swaps it atomically on
//! rebuild.

pub mod catalog;
pub mod descriptor;
pub mod registry;

pub use catalog::{Catalog, Listing, PluginForm};
pub use descriptor::{
    Documentation, Form, FormComponent, FormField, FormGroup, PluginDescriptor, PortDoc,
    RemoteDescriptor, RemoteMetadata, RemoteSpec, ServiceDescriptor,
};
pub use registry::{Registry, RegistryBuilder, ServiceSpec};
