pub mod branches;
pub mod browse;
pub mod cache;
pub mod complete;
pub mod repos;

pub use branches::*;
pub use browse::*;
pub use cache::*;
pub use complete::*;
pub use repos::*;
