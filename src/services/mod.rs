pub mod access;
pub mod auto_delete;
pub mod health;
pub mod link_probe;
pub mod permissions;
