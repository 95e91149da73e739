//! SDK operations: dWallet MPC requests and the machinery they share.
//!
//! Each request follows the pattern:
//!
//! 1. Check cancellation token
//! 2. Look up the coordinator and open a transaction with a fresh session
//! 3. Build, sign, and submit the request
//! 4. Correlate the acknowledgement with a result object and poll it

pub mod events;
pub mod polling;
pub mod presign;
pub mod publish_secret_share;
pub mod request;
pub mod tracking;
