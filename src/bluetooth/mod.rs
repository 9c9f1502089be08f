pub mod l2cap;
pub mod sdp;
pub mod session;

#[cfg(test)]
mod l2cap_test;
