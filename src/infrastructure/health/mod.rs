//! Health infrastructure - handle verification


pub use smoke_test::SmokeTestVerifier;
