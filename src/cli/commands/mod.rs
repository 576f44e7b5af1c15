pub mod add;
pub mod build;
pub mod detect;
pub mod init;
pub mod status;
pub mod sync;
