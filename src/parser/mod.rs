pub mod normalize;
pub mod salary;

pub use normalize::normalize;
pub use salary::parse_salary;
