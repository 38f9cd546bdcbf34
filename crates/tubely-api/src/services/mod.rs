pub mod ownership;
pub mod signing;
