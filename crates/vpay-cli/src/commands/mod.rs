pub mod dispatch;
pub mod extraction;
pub mod history;
pub mod init;
pub mod logs;
pub mod reference;
pub mod schema;
pub mod shared;
pub mod validate;
