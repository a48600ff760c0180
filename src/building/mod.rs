pub mod registry;

#[cfg(test)]
mod registry_tests;

pub use registry::Floor;
pub use registry::FloorRegistry;
