#![allow(dead_code)]

pub mod gmail_server;
