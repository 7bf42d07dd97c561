pub mod apply;
pub mod facts;
