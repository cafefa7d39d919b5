#![allow(dead_code)]

pub mod http_server;
pub mod s3_server;
pub mod server;
