pub mod client;

pub use client::YahooClient;
