//! kmodfw - derive the kernel modules and firmware an image must ship.
//!
//! Two stages, meant to be piped together:
//! - [`lister`] turns the running kernel's loaded modules into config path
//!   fragments (`/drivers/nvme/host/nvme`)
//! - [`firmware`] turns such fragments into a `FirmwareFiles=` block

pub mod commands;
pub mod config;
pub mod firmware;
pub mod fragment;
pub mod lister;
pub mod modinfo;
pub mod pool;
pub mod preflight;
pub mod process;
pub mod registry;
