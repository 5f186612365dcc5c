pub mod singer;
pub mod streams;
pub mod sync;
