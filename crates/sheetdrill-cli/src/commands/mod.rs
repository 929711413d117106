pub mod dataset;
pub mod init;
pub mod list_models;
pub mod run;
pub mod validate;
