pub mod check;
pub mod get;
pub mod options;
pub mod show;
