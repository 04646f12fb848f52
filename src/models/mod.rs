pub mod review;

pub use review::ReviewRecord;
