pub mod cars;
pub mod catalog;
