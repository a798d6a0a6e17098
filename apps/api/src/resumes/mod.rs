//! Resume intake and history.

pub mod handlers;
