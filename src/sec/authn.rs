pub mod session;
pub mod initiator;
