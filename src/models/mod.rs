pub mod user;
pub mod client;
pub mod sale;
pub mod commission;
pub mod receipt;
pub mod monthly_goal;
pub mod annual_goal;
