pub mod accuracy;
pub mod aggregate;
pub mod config;
pub mod efficiency;
pub mod elo;
pub mod error;
pub mod espn;
pub mod games;
pub mod http_client;
pub mod injuries;
pub mod prediction;
pub mod predictor;
pub mod rankings;
pub mod season;
pub mod stat_normalize;
pub mod store;
pub mod teams;
