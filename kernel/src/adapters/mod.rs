pub mod cloudapi;
pub mod remote;
