pub mod basin;
pub mod config;
pub mod dataset;
pub mod ensemble;
pub mod field;
pub mod naming;
pub mod projection;
pub mod slc;
pub mod validate;

pub mod errors;
