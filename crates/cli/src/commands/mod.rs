pub mod ask;
pub mod history;
pub mod onboard;
pub mod recipes;
pub mod serve;
