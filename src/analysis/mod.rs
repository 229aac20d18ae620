pub mod attributes;
pub mod clustering;
pub mod direct;
pub mod modification;
pub mod quadrants;
