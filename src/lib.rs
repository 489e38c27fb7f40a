// SPDX-License-Identifier: Apache-2.0
pub mod error;
pub mod firm;
pub mod logging;
pub mod memory_store;
pub mod preview;
pub mod prospect;
pub mod routes;
pub mod settings;
pub mod store;
pub mod templates;
