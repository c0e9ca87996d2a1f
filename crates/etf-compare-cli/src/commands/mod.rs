pub mod compare;
pub mod returns;
