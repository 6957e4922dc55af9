//! Metadata service access and replica discovery

pub mod client;
pub mod discovery;

pub use client::{Container, HttpMetadataClient, MetadataApi, Service};
pub use discovery::{Discovery, DiscoverySnapshot, ReplicaDescriptor};
