pub mod access;
pub mod ordering;
