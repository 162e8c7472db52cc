//! Service layer: achievement catalog, unlock evaluation, grant recording
//! and habit/completion bookkeeping.

pub mod services;
