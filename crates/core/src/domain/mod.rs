pub mod adjustment;
pub mod contract;
pub mod overnight;
pub mod recommendation;
