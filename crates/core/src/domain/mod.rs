pub mod contract;
pub mod post;
pub mod report;
