//! Example contracts exercising the SDK's public surface.

pub mod freeze;
pub mod probe;
