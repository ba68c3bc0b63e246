//! Persistent storage for the metadata / lookup side of the dual store

mod registry;

pub use registry::RegistryDb;
