pub mod claim_service;
pub mod faucet_service;
pub mod gateway;
pub mod profile_service;
pub mod registration_service;
pub mod stream_service;
pub mod transfer_service;
pub mod wizard;
